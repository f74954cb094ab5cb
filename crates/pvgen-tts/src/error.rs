//! Error types for speech synthesis.

use thiserror::Error;

/// Result type for synthesis operations.
pub type TtsResult<T> = Result<T, TtsError>;

/// Errors that can occur while producing voiceover audio.
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Synthesis API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Synthesis response carried no audio content")]
    MissingAudioContent,

    #[error("Audio content is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TtsError {
    /// Create an API error from a status code and body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}
