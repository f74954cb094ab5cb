//! Structured per-user logging.

use tracing::{error, info, warn, Span};

/// Logger carrying a user's key through the pipeline stages.
#[derive(Debug, Clone)]
pub struct UserLogger {
    user_key: String,
    client: String,
}

impl UserLogger {
    pub fn new(user_key: &str, client: &str) -> Self {
        Self {
            user_key: user_key.to_string(),
            client: client.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(user_key = %self.user_key, client = %self.client, "Pipeline started: {}", message);
    }

    pub fn log_progress(&self, message: &str) {
        info!(user_key = %self.user_key, client = %self.client, "Pipeline progress: {}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(user_key = %self.user_key, client = %self.client, "Pipeline warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(user_key = %self.user_key, client = %self.client, "Pipeline error: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(user_key = %self.user_key, client = %self.client, "Pipeline completed: {}", message);
    }

    pub fn user_key(&self) -> &str {
        &self.user_key
    }

    /// Create a tracing span carrying the user context.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "user_pipeline",
            user_key = %self.user_key,
            client = %self.client
        )
    }
}
