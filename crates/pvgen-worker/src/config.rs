//! Worker configuration.

use std::path::PathBuf;

use crate::error::{BatchError, WorkerResult};

/// Batch worker configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Client this batch belongs to; names the result sheet
    pub client_name: String,
    /// CSV sheet with one customer per row
    pub customer_sheet: PathBuf,
    /// Field mapping JSON
    pub mapping_path: PathBuf,
    /// Video template JSON
    pub template_path: PathBuf,
    /// Voice configuration JSON
    pub voice_config_path: PathBuf,

    /// Directory with background template clips
    pub templates_dir: PathBuf,
    /// Directory with `{font}.ttf` files
    pub fonts_dir: PathBuf,
    /// Background music track
    pub music_path: PathBuf,

    /// Scratch and output root
    pub work_dir: PathBuf,

    /// First data row to process, 1-based inclusive
    pub start_row: u32,
    /// Last data row to process, 1-based inclusive
    pub end_row: u32,

    /// Concurrent users in flight
    pub max_concurrent_users: usize,
    /// Kill a render that runs longer than this
    pub render_timeout_secs: u64,
    /// Per-segment synthesis timeout
    pub synthesis_timeout_secs: u64,
    /// Draw translucent boxes over overlay regions
    pub debug_boxes: bool,
}

impl WorkerConfig {
    /// Create config from environment variables.
    ///
    /// Input paths are required; tuning knobs have defaults.
    pub fn from_env() -> WorkerResult<Self> {
        let assets_dir = PathBuf::from(env_or("ASSETS_DIR", "assets"));
        let work_dir = PathBuf::from(env_or("WORK_DIR", "/tmp/pvgen"));

        let start_row = parse_env("START_ROW", 1u32)?;
        let end_row = parse_env("END_ROW", start_row)?;
        if end_row < start_row {
            return Err(BatchError::config(format!(
                "END_ROW ({}) is before START_ROW ({})",
                end_row, start_row
            )));
        }

        Ok(Self {
            client_name: required("CLIENT_NAME")?,
            customer_sheet: required("CUSTOMER_SHEET")?.into(),
            mapping_path: required("CUSTOMER_MAPPING_PATH")?.into(),
            template_path: required("VIDEO_TEMPLATE_PATH")?.into(),
            voice_config_path: required("VOICE_CONFIG_PATH")?.into(),
            templates_dir: std::env::var("TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| assets_dir.join("templates")),
            fonts_dir: std::env::var("FONTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| assets_dir.join("fonts")),
            music_path: std::env::var("MUSIC_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| assets_dir.join("music.mp3")),
            work_dir,
            start_row,
            end_row,
            max_concurrent_users: parse_env("MAX_CONCURRENT_USERS", 2usize)?,
            render_timeout_secs: parse_env("RENDER_TIMEOUT_SECS", 600u64)?,
            synthesis_timeout_secs: parse_env("SYNTHESIS_TIMEOUT_SECS", 60u64)?,
            debug_boxes: std::env::var("DEBUG_OVERLAY_BOXES")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    /// Directory for synthesized audio, one subdirectory per user.
    pub fn voiceovers_dir(&self) -> PathBuf {
        self.work_dir.join("voiceovers")
    }

    /// Directory for rendered videos.
    pub fn videos_dir(&self) -> PathBuf {
        self.work_dir.join("videos")
    }

    /// Directory for extracted cover images.
    pub fn cover_images_dir(&self) -> PathBuf {
        self.work_dir.join("cover_images")
    }

    /// Directory for result sheets.
    pub fn results_dir(&self) -> PathBuf {
        self.work_dir.join("results")
    }

    /// Per-user scratch directory for overlay and border images.
    pub fn scratch_dir(&self, key: &str) -> PathBuf {
        self.work_dir.join("scratch").join(key)
    }
}

fn required(name: &str) -> WorkerResult<String> {
    std::env::var(name).map_err(|_| BatchError::config(format!("{} not set", name)))
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> WorkerResult<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| BatchError::config(format!("{} is not a valid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
