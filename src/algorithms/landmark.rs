//! Least-squares landmark registration (absolute orientation).
//!
//! Estimates the rigid-body or similarity transform that maps an ordered set of
//! "from" landmarks onto corresponding "to" landmarks, via the SVD of their
//! cross-covariance matrix.

use crate::data::{Point, Transform};
use crate::utils::{centroid, cross_covariance, spread};
use nalgebra::{Matrix3, SVD};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fewest correspondences that determine a rotation
pub const MIN_LANDMARKS: usize = 3;

/// Iteration cap for the 3x3 SVD; convergence normally takes a handful
const SVD_MAX_ITERATIONS: usize = 1000;

/// Whether a uniform scale factor is estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignmentMode {
    #[default]
    RigidBody,
    Similarity,
}

impl AlignmentMode {
    /// Parse a mode name; anything other than `"Similarity"` selects `RigidBody`
    pub fn from_name(name: &str) -> Self {
        match name {
            "Similarity" => AlignmentMode::Similarity,
            "RigidBody" => AlignmentMode::RigidBody,
            other => {
                tracing::warn!(mode = other, "Unrecognized registration mode, using RigidBody");
                AlignmentMode::RigidBody
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AlignmentMode::RigidBody => "RigidBody",
            AlignmentMode::Similarity => "Similarity",
        }
    }
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlignmentMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

/// Caller errors, plus inputs whose magnitude overflows the computation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    #[error("One or more fiducial lists not defined.")]
    MissingInput,

    #[error("One or more fiducial lists has too few fiducials.")]
    InsufficientPoints { from: usize, to: usize },

    #[error("Fiducial lists have unequal number of fiducials.")]
    MismatchedCounts { from: usize, to: usize },

    #[error("Fiducial positions must be finite.")]
    NonFiniteInput,

    #[error("Fiducial positions are too large to register.")]
    DecompositionFailed,
}

impl AlignmentError {
    /// Human-readable status string reported to the host
    pub fn status_message(&self) -> String {
        self.to_string()
    }
}

/// Landmark aligner bound to a registration mode
#[derive(Debug, Clone, Copy, Default)]
pub struct LandmarkAligner {
    mode: AlignmentMode,
}

impl LandmarkAligner {
    pub fn new(mode: AlignmentMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AlignmentMode {
        self.mode
    }

    pub fn align(&self, from: &[Point], to: &[Point]) -> Result<Transform, AlignmentError> {
        align(from, to, self.mode)
    }
}

fn check_inputs(from: &[Point], to: &[Point]) -> Result<(), AlignmentError> {
    if from.is_empty() || to.is_empty() {
        return Err(AlignmentError::MissingInput);
    }
    if from.len() < MIN_LANDMARKS || to.len() < MIN_LANDMARKS {
        return Err(AlignmentError::InsufficientPoints {
            from: from.len(),
            to: to.len(),
        });
    }
    if from.len() != to.len() {
        return Err(AlignmentError::MismatchedCounts {
            from: from.len(),
            to: to.len(),
        });
    }
    let finite = |p: &Point| p.coords.iter().all(|v| v.is_finite());
    if !from.iter().all(finite) || !to.iter().all(finite) {
        return Err(AlignmentError::NonFiniteInput);
    }
    Ok(())
}

/// Best-fit transform mapping `from[i]` onto `to[i]` in the least-squares sense.
///
/// The rotation block of the result is always a proper rotation. Collinear
/// landmarks leave the rotation about their common axis undetermined; one valid
/// minimizer is still returned.
pub fn align(from: &[Point], to: &[Point], mode: AlignmentMode) -> Result<Transform, AlignmentError> {
    check_inputs(from, to)?;

    let from_centroid = centroid(from).ok_or(AlignmentError::MissingInput)?;
    let to_centroid = centroid(to).ok_or(AlignmentError::MissingInput)?;
    let h = cross_covariance(from, to, &from_centroid, &to_centroid);

    // Finite but huge coordinates overflow the covariance
    if !h.iter().all(|v| v.is_finite()) {
        tracing::warn!(landmarks = from.len(), "Landmark covariance overflowed");
        return Err(AlignmentError::DecompositionFailed);
    }

    let svd = SVD::try_new(h, true, true, f64::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or(AlignmentError::DecompositionFailed)?;
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(AlignmentError::DecompositionFailed),
    };
    let singular_values = svd.singular_values;

    let mut v = v_t.transpose();
    let mut rotation: Matrix3<f64> = v * u.transpose();
    let mut reflection_sign = [1.0; 3];

    if rotation.determinant() < 0.0 {
        // Flip the axis of least support to turn the reflection into a rotation
        let weakest = singular_values.imin();
        v.column_mut(weakest).neg_mut();
        reflection_sign[weakest] = -1.0;
        rotation = v * u.transpose();
        tracing::debug!(axis = weakest, "Corrected reflection in landmark rotation");
    }

    let scale = match mode {
        AlignmentMode::RigidBody => 1.0,
        AlignmentMode::Similarity => {
            let from_spread = spread(from, &from_centroid);
            if from_spread > 0.0 {
                let weighted: f64 = singular_values
                    .iter()
                    .zip(reflection_sign.iter())
                    .map(|(sigma, sign)| sigma * sign)
                    .sum();
                weighted / from_spread
            } else {
                1.0
            }
        }
    };

    let translation = to_centroid.coords - scale * (rotation * from_centroid.coords);
    if !scale.is_finite()
        || !rotation.iter().all(|v| v.is_finite())
        || !translation.iter().all(|v| v.is_finite())
    {
        return Err(AlignmentError::DecompositionFailed);
    }

    tracing::debug!(
        mode = %mode,
        landmarks = from.len(),
        scale = scale,
        "Landmark alignment completed"
    );

    Ok(Transform::from_parts(scale, &rotation, &translation))
}

/// Align independent landmark pairs in parallel; results keep input order
pub fn align_batch(
    pairs: &[(Vec<Point>, Vec<Point>)],
    mode: AlignmentMode,
) -> Vec<Result<Transform, AlignmentError>> {
    pairs
        .par_iter()
        .map(|(from, to)| align(from, to, mode))
        .collect()
}
