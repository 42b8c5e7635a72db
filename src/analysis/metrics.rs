use crate::algorithms::AlignmentMode;
use crate::data::{Point, Transform};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Distance between each mapped `from` landmark and its `to` counterpart
pub fn residuals(transform: &Transform, from: &[Point], to: &[Point]) -> Vec<f64> {
    from.iter()
        .zip(to.iter())
        .map(|(f, t)| (transform.transform_point(f) - t).norm())
        .collect()
}

/// Root-mean-square fiducial registration error
pub fn rms_error(transform: &Transform, from: &[Point], to: &[Point]) -> f64 {
    let residuals = residuals(transform, from, to);
    if residuals.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = residuals.iter().map(|r| r * r).sum();
    (sum_sq / residuals.len() as f64).sqrt()
}

/// Angle of the relative rotation between two transforms, in degrees
pub fn rotation_angle_error_degrees(a: &Transform, b: &Transform) -> f64 {
    let relative = a.rotation().transpose() * b.rotation();
    let cos_angle = ((relative.trace() - 1.0) / 2.0).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

pub fn translation_error(a: &Transform, b: &Transform) -> f64 {
    (a.translation() - b.translation()).norm()
}

pub fn scale_error(a: &Transform, b: &Transform) -> f64 {
    (a.scale() - b.scale()).abs()
}

/// Summary of one registration, written alongside the transform by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationReport {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub mode: AlignmentMode,
    pub point_count: usize,
    pub scale: f64,
    pub rms_error: f64,
    pub max_error: f64,
    pub transform: Transform,
}

impl RegistrationReport {
    pub fn new(
        run_id: Uuid,
        mode: AlignmentMode,
        transform: Transform,
        from: &[Point],
        to: &[Point],
    ) -> Self {
        let residuals = residuals(&transform, from, to);
        let max_error = residuals.iter().cloned().fold(0.0, f64::max);

        Self {
            run_id,
            created_at: Utc::now(),
            mode,
            point_count: from.len(),
            scale: transform.scale(),
            rms_error: rms_error(&transform, from, to),
            max_error,
            transform,
        }
    }
}
