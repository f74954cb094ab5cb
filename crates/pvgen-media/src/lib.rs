//! FFmpeg-based media layer for PVGen.
//!
//! Wraps the ffmpeg/ffprobe CLIs behind a builder + runner, lays out overlay
//! text inside fixed boxes, rasterizes overlay and animated-border images,
//! and composes the final per-user video (background + dialogue + music +
//! overlays) plus its thumbnail.

pub mod border;
pub mod command;
pub mod compose;
pub mod error;
pub mod fs_utils;
pub mod layout;
pub mod probe;
pub mod raster;
pub mod thumbnail;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use compose::{compose_scene, ComposeOptions, ComposePhase};
pub use error::{MediaError, MediaResult};
pub use layout::{layout_text, load_font, TextLayout};
pub use probe::{probe_video, VideoInfo};
pub use thumbnail::capture_thumbnail;
