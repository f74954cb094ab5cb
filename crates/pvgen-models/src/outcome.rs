//! Per-user pipeline outcomes.

use serde::{Deserialize, Serialize};

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ConfigLoad,
    ScriptGeneration,
    AudioSynthesis,
    Directories,
    VideoRender,
    Upload,
    Logging,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::ConfigLoad => "config_load",
            Stage::ScriptGeneration => "script_generation",
            Stage::AudioSynthesis => "audio_synthesis",
            Stage::Directories => "directories",
            Stage::VideoRender => "video_render",
            Stage::Upload => "upload",
            Stage::Logging => "logging",
        };
        f.write_str(name)
    }
}

/// Terminal result of one user's pipeline run. Written once per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Success {
        key: String,
        /// Remote location of the rendered video
        video_url: String,
        /// Remote location of the thumbnail
        cover_image_url: String,
        /// Seconds; equals the background clip's native duration
        video_duration: f64,
    },
    Failure {
        key: String,
        stage: Stage,
        message: String,
    },
}

impl PipelineOutcome {
    pub fn key(&self) -> &str {
        match self {
            PipelineOutcome::Success { key, .. } => key,
            PipelineOutcome::Failure { key, .. } => key,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success { .. })
    }
}
