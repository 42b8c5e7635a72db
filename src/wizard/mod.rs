//! Host-facing registration logic.
//!
//! Mirrors the fiducial registration workflow of a surgical navigation host:
//! compute a landmark transform between two fiducial lists into an output node,
//! and capture tracked probe tip positions into the active list.

use crate::algorithms::{align, AlignmentError, AlignmentMode, MIN_LANDMARKS};
use crate::analysis::rms_error;
use crate::data::{FiducialList, LinearTransformNode, Point, Transform};

pub const STATUS_SUCCESS: &str = "Success.";
pub const STATUS_OUTPUT_MISSING: &str = "Output transform is not defined.";

/// Registration logic owning the active fiducial list
#[derive(Debug, Default)]
pub struct RegistrationWizard {
    active_list: Option<FiducialList>,
    last_registration_error: Option<f64>,
}

impl RegistrationWizard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the list that probe captures are appended to
    pub fn set_active_list(&mut self, list: FiducialList) {
        tracing::debug!(list = %list.name, "Active fiducial list changed");
        self.active_list = Some(list);
    }

    pub fn active_list(&self) -> Option<&FiducialList> {
        self.active_list.as_ref()
    }

    pub fn take_active_list(&mut self) -> Option<FiducialList> {
        self.active_list.take()
    }

    /// RMS residual of the last successful `calculate_transform`
    pub fn last_registration_error(&self) -> Option<f64> {
        self.last_registration_error
    }

    /// Append the world-space probe tip (translation column of its pose) to the active list.
    ///
    /// A missing probe or no active list is ignored.
    pub fn add_fiducial(&mut self, probe_to_world: Option<&Transform>) -> Option<usize> {
        let probe_to_world = probe_to_world?;
        let active = self.active_list.as_mut()?;

        let tip = Point::from(probe_to_world.translation());
        let index = active.add_fiducial(tip);
        tracing::info!(
            list = %active.name,
            index = index,
            x = tip.x,
            y = tip.y,
            z = tip.z,
            "Captured probe fiducial"
        );
        Some(index)
    }

    /// Like [`add_fiducial`](Self::add_fiducial), with the tip expressed in the
    /// frame of a tracked reference instead of world coordinates.
    ///
    /// A reference pose without an inverse is ignored, as is a missing probe.
    pub fn add_fiducial_in_reference(
        &mut self,
        probe_to_world: Option<&Transform>,
        reference_to_world: &Transform,
    ) -> Option<usize> {
        let probe_to_world = probe_to_world?;
        let world_to_reference = match reference_to_world.inverse() {
            Some(inverse) => inverse,
            None => {
                tracing::warn!("Reference pose is not invertible, capture skipped");
                return None;
            }
        };
        self.add_fiducial(Some(&world_to_reference.compose(probe_to_world)))
    }

    /// Register `from` onto `to` and store the result in `output`.
    ///
    /// Returns the host status string; on failure `output` is left untouched.
    pub fn calculate_transform(
        &mut self,
        from: Option<&FiducialList>,
        to: Option<&FiducialList>,
        output: Option<&mut LinearTransformNode>,
        transform_type: &str,
    ) -> String {
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            _ => return AlignmentError::MissingInput.status_message(),
        };
        let output = match output {
            Some(output) => output,
            None => return STATUS_OUTPUT_MISSING.to_string(),
        };
        if from.len() < MIN_LANDMARKS || to.len() < MIN_LANDMARKS {
            return AlignmentError::InsufficientPoints {
                from: from.len(),
                to: to.len(),
            }
            .status_message();
        }

        let span = crate::correlation_span!(tracing::Level::DEBUG, "calculate_transform", landmarks = from.len());
        let _enter = span.enter();

        let mode = AlignmentMode::from_name(transform_type);
        let from_points = from.to_point_set();
        let to_points = to.to_point_set();

        match align(&from_points, &to_points, mode) {
            Ok(transform) => {
                let error = rms_error(&transform, &from_points, &to_points);
                tracing::info!(
                    from = %from.name,
                    to = %to.name,
                    output = %output.name,
                    mode = %mode,
                    rms_error = error,
                    "Fiducial registration succeeded"
                );
                output.set_matrix_transform_to_parent(transform);
                self.last_registration_error = Some(error);
                STATUS_SUCCESS.to_string()
            }
            Err(e) => {
                tracing::warn!(from = %from.name, to = %to.name, error = %e, "Fiducial registration rejected");
                e.status_message()
            }
        }
    }
}
