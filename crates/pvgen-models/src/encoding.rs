//! Render constants shared across crates.

/// Output frame rate.
pub const VIDEO_FPS: u32 = 24;

/// Output video codec.
pub const VIDEO_CODEC: &str = "libx264";

/// Starting font size when an overlay does not declare one.
pub const DEFAULT_FONT_SIZE: f32 = 120.0;

/// Font size decrement per fit attempt, in points.
pub const FONT_SIZE_STEP: f32 = 5.0;

/// Smallest font size the layout engine will try.
pub const FONT_SIZE_FLOOR: f32 = 25.0;

/// Maximum wrapped lines per overlay box.
pub const DEFAULT_MAX_LINES: u32 = 3;

/// Default overlay text color.
pub const DEFAULT_TEXT_COLOR: &str = "#FB37B5";

/// Background music attenuation.
pub const MUSIC_VOLUME: f64 = 0.25;

/// Background music fade-out tail, in seconds.
pub const MUSIC_FADEOUT_SECS: f64 = 2.0;

/// Thumbnail frame offset back from the end of the video, in seconds.
pub const THUMBNAIL_BACK_OFFSET_SECS: f64 = 2.0;

/// Last-resort background file name.
pub const FALLBACK_BACKGROUND_FILE: &str = "default.mp4";

/// Render attempts before the user is failed.
pub const RENDER_MAX_ATTEMPTS: u32 = 3;

/// Margin the animated border leaves around its overlay box, in pixels.
pub const BORDER_MARGIN_PX: u32 = 15;
