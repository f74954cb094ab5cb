//! Overlay definitions from the video template document.

use serde::{Deserialize, Serialize};

/// Top-left corner of an overlay box, in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Overlay box size, in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Animated border around an overlay box.
///
/// The border draws clockwise from the top-left over `duration` seconds
/// (a quarter of the duration per side), then holds for the rest of the
/// overlay's lifespan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimatedBorderSpec {
    #[serde(default)]
    pub enabled: bool,
    /// RGB line color
    #[serde(default = "default_border_color")]
    pub color: [u8; 3],
    #[serde(default = "default_line_width")]
    pub line_width: u32,
    /// Seconds the draw animation takes
    #[serde(default = "default_border_duration")]
    pub duration: f64,
}

fn default_border_color() -> [u8; 3] {
    [255, 255, 255]
}

fn default_line_width() -> u32 {
    15
}

fn default_border_duration() -> f64 {
    2.0
}

/// A positioned, time-bounded text element from the template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayDefinition {
    /// Overlay name, also the SSML mark it can be timed against
    pub name: String,
    /// Static text; takes precedence over `field_name`
    #[serde(default)]
    pub text: Option<String>,
    /// Field reference into the normalized video data
    #[serde(default)]
    pub field_name: Option<String>,
    pub position: Position,
    pub dimensions: Dimensions,
    /// Font name, resolved against the fonts directory
    #[serde(default)]
    pub font: Option<String>,
    #[serde(default)]
    pub font_size: Option<f32>,
    /// Hex text color, e.g. "#FB37B5"
    #[serde(default)]
    pub color: Option<String>,
    /// Explicit start time in seconds (defaults to 0)
    #[serde(default)]
    pub default_time: Option<f64>,
    /// Absolute end time; wins over `duration`
    #[serde(default)]
    pub show_till: Option<f64>,
    /// Explicit duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub animated_border: Option<AnimatedBorderSpec>,
}
