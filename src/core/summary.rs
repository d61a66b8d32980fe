//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting the outcome of
//! one trigger run.

use crate::domain::{HdxError, RawDataApiError, TaskId};
use std::time::Duration;

/// A submitted export and the task the API created for it
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedExport {
    /// Descriptor label, e.g. `7 [NPL] Nepal`
    pub export: String,

    pub task_id: TaskId,
}

/// Summary of a trigger run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Descriptors collected from all sources
    pub exports_found: usize,

    /// Lookups that produced no descriptor
    pub lookups_missed: usize,

    /// Accepted submissions in submission order
    pub submitted: Vec<SubmittedExport>,

    /// Payloads built but not sent (dry run)
    pub dry_run_payloads: usize,

    /// Duration of the run
    pub duration: Duration,

    /// Per-export failures
    pub errors: Vec<RunError>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record an accepted submission
    pub fn add_submitted(&mut self, export: String, task_id: TaskId) {
        self.submitted.push(SubmittedExport { export, task_id });
    }

    /// Add an error
    pub fn add_error(&mut self, error: RunError) {
        self.errors.push(error);
    }

    /// Task ids in submission order
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.submitted.iter().map(|s| s.task_id.clone()).collect()
    }

    /// Check if every export went through (no failures)
    pub fn is_successful(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether some exports failed while others were accepted
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty() && (!self.submitted.is_empty() || self.dry_run_payloads > 0)
    }

    /// Whether any failure was a connection problem
    pub fn has_connection_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.error_type == RunErrorType::Connection)
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.submitted.len() + self.errors.len();
        if attempted == 0 {
            return 100.0;
        }
        (self.submitted.len() as f64 / attempted as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            exports_found = self.exports_found,
            lookups_missed = self.lookups_missed,
            submitted = self.submitted.len(),
            failed = self.errors.len(),
            dry_run_payloads = self.dry_run_payloads,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Trigger run completed"
        );

        for error in &self.errors {
            tracing::warn!(
                error_type = ?error.error_type,
                export = %error.export,
                message = %error.message,
                "Export not submitted"
            );
        }
    }
}

/// Type of run error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunErrorType {
    /// Server unreachable or timed out
    Connection,
    /// Still throttled after every cooldown
    RateLimited,
    /// Server refused the payload
    Rejected,
    /// Payload could not be built from the descriptor
    Payload,
    /// Server answered with something unusable
    InvalidResponse,
    /// Unknown error
    Unknown,
}

impl From<&HdxError> for RunErrorType {
    fn from(err: &HdxError) -> Self {
        match err {
            HdxError::Api(api) => match api {
                RawDataApiError::Transport(_) | RawDataApiError::Timeout(_) => Self::Connection,
                RawDataApiError::RateLimited { .. } => Self::RateLimited,
                RawDataApiError::HttpStatus { .. } => Self::Rejected,
                RawDataApiError::InvalidResponse(_) => Self::InvalidResponse,
                _ => Self::Unknown,
            },
            HdxError::Submission(_) => Self::RateLimited,
            HdxError::Serialization(_) | HdxError::Validation(_) => Self::Payload,
            _ => Self::Unknown,
        }
    }
}

/// Failure of one export, with the export it belongs to
#[derive(Debug, Clone)]
pub struct RunError {
    pub error_type: RunErrorType,
    pub export: String,
    pub message: String,
}

impl RunError {
    /// Create a run error from the failure of one export
    pub fn from_error(export: String, error: &HdxError) -> Self {
        Self {
            error_type: RunErrorType::from(error),
            export,
            message: error.to_string(),
        }
    }
}
