//! Worker error types.
//!
//! Two severities: [`BatchError`] aborts the whole run (bad configuration,
//! unreadable customer sheet), while [`StageError`] fails a single user and
//! becomes a failure outcome for that user's row.

use thiserror::Error;

use pvgen_models::field_mapping::MappingError;
use pvgen_models::{PipelineOutcome, Stage};
use pvgen_storage::StorageError;

/// Result type for batch-level operations.
pub type WorkerResult<T> = Result<T, BatchError>;

/// Fatal errors that abort the batch before or during setup.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Customer sheet error: {0}")]
    Ingest(String),

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl BatchError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn ingest(msg: impl Into<String>) -> Self {
        Self::Ingest(msg.into())
    }
}

/// A per-user failure, tied to the stage it happened in.
#[derive(Debug, Error)]
#[error("{stage} failed: {message}")]
pub struct StageError {
    pub stage: Stage,
    pub message: String,
}

impl StageError {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }

    /// Turn this error into the failure outcome for a user.
    pub fn into_outcome(self, key: impl Into<String>) -> PipelineOutcome {
        PipelineOutcome::Failure {
            key: key.into(),
            stage: self.stage,
            message: self.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_outcome() {
        let err = StageError::new(Stage::AudioSynthesis, "api quota exceeded");
        let outcome = err.into_outcome("911234");
        assert!(!outcome.is_success());
        assert_eq!(outcome.key(), "911234");
    }

    #[test]
    fn test_stage_error_display_names_stage() {
        let err = StageError::new(Stage::VideoRender, "ffmpeg exited 1");
        assert_eq!(err.to_string(), "video_render failed: ffmpeg exited 1");
    }
}
