use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A landmark position in a shared reference frame
pub type Point = Point3<f64>;

/// Ordered landmark positions; index establishes correspondence
pub type PointSet = Vec<Point>;

/// 4x4 homogeneous transform composed as `p' = s * R * p + t`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "MatrixRows", into = "MatrixRows")]
pub struct Transform {
    matrix: Matrix4<f64>,
}

/// Row-major serialized form of a [`Transform`]
#[derive(Serialize, Deserialize)]
struct MatrixRows {
    matrix: [[f64; 4]; 4],
}

impl From<MatrixRows> for Transform {
    fn from(rows: MatrixRows) -> Self {
        let mut matrix = Matrix4::zeros();
        for (r, row) in rows.matrix.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                matrix[(r, c)] = *value;
            }
        }
        Self { matrix }
    }
}

impl From<Transform> for MatrixRows {
    fn from(transform: Transform) -> Self {
        let mut matrix = [[0.0; 4]; 4];
        for (r, row) in matrix.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = transform.matrix[(r, c)];
            }
        }
        Self { matrix }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Wrap an arbitrary homogeneous matrix, e.g. a tracked probe pose
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Assemble from a uniform scale, a proper rotation and a translation
    pub fn from_parts(scale: f64, rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Self {
        let mut matrix = Matrix4::identity();
        matrix
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&(rotation * scale));
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
        Self { matrix }
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// The upper-left 3x3 block, i.e. `s * R`
    pub fn linear(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Uniform scale factor, recovered as the cube root of the linear block's determinant
    pub fn scale(&self) -> f64 {
        self.linear().determinant().cbrt()
    }

    /// Rotation block with the scale divided out.
    ///
    /// A zero scale (every target landmark coincident) leaves no rotation to
    /// recover; the zero linear block is returned as is.
    pub fn rotation(&self) -> Matrix3<f64> {
        let scale = self.scale();
        if scale == 0.0 {
            return self.linear();
        }
        self.linear() / scale
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    pub fn transform_point(&self, point: &Point) -> Point {
        Point::from(self.linear() * point.coords + self.translation())
    }

    /// Inverse similarity; `None` when the scale collapsed to zero
    pub fn inverse(&self) -> Option<Self> {
        let scale = self.scale();
        if scale == 0.0 || !scale.is_finite() {
            return None;
        }
        let rotation_t = self.rotation().transpose();
        let inv_scale = 1.0 / scale;
        let translation = -(rotation_t * self.translation()) * inv_scale;
        Some(Self::from_parts(inv_scale, &rotation_t, &translation))
    }

    /// `self ∘ other`: apply `other` first, then `self`
    pub fn compose(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(6);
        for r in 0..4 {
            let row: Vec<String> = (0..4)
                .map(|c| format!("{:>width$.prec$}", self.matrix[(r, c)], width = precision + 5, prec = precision))
                .collect();
            writeln!(f, "[{}]", row.join(" "))?;
        }
        Ok(())
    }
}
