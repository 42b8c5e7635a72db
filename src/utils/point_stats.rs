use crate::data::Point;
use nalgebra::{Matrix3, Vector3};

/// Mean position of a point set; `None` for an empty set
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }

    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc: Vector3<f64>, p| acc + p.coords);
    Some(Point::from(sum / points.len() as f64))
}

/// Cross-covariance `H = Σ (from_i - c_from) ⊗ (to_i - c_to)` over corresponding pairs
pub fn cross_covariance(
    from: &[Point],
    to: &[Point],
    from_centroid: &Point,
    to_centroid: &Point,
) -> Matrix3<f64> {
    from.iter()
        .zip(to.iter())
        .fold(Matrix3::zeros(), |h, (f, t)| {
            h + (f - from_centroid) * (t - to_centroid).transpose()
        })
}

/// Sum of squared distances to the centroid
pub fn spread(points: &[Point], centroid: &Point) -> f64 {
    points.iter().map(|p| (p - centroid).norm_squared()).sum()
}
