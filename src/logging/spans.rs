//! Structured span for a registration run

use crate::algorithms::AlignmentMode;
use std::time::Instant;
use tracing::{field, span, Level, Span};
use uuid::Uuid;

/// Span covering one landmark registration, from input loading to result
pub struct RegistrationSpan {
    span: Span,
    start_time: Instant,
    run_id: Uuid,
}

impl RegistrationSpan {
    pub fn new(mode: AlignmentMode, run_id: Uuid) -> Self {
        let span = span!(
            Level::INFO,
            "registration",
            mode = %mode,
            run_id = %run_id,
            landmarks = field::Empty,
            rms_error = field::Empty,
            execution_time_ms = field::Empty,
        );

        Self {
            span,
            start_time: Instant::now(),
            run_id,
        }
    }

    pub fn record_inputs(&self, from_name: &str, to_name: &str, landmarks: usize) {
        self.span.record("landmarks", landmarks);
        tracing::debug!(
            parent: &self.span,
            from = from_name,
            to = to_name,
            landmarks = landmarks,
            "Registration inputs loaded"
        );
    }

    pub fn record_result(&self, status: &str, rms_error: Option<f64>) {
        let duration = self.start_time.elapsed();
        self.span.record("execution_time_ms", duration.as_secs_f64() * 1000.0);
        if let Some(error) = rms_error {
            self.span.record("rms_error", error);
        }
        tracing::info!(
            parent: &self.span,
            status = status,
            rms_error = rms_error,
            execution_time_ms = duration.as_secs_f64() * 1000.0,
            "Registration finished"
        );
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}
