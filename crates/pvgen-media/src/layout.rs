//! Text layout engine.
//!
//! Finds a line-wrap and font-size combination that fits a text inside a
//! fixed box. The search is the greedy heuristic the layouts downstream are
//! tuned against: probe the one-line width to derive a character budget,
//! sweep line counts 1..max_lines, and only then step the font size down in
//! fixed decrements to a floor. Best-effort, not optimal typesetting.

use std::path::Path;

use fontdue::{Font, FontSettings};
use tracing::warn;

use pvgen_models::encoding::{FONT_SIZE_FLOOR, FONT_SIZE_STEP};
use pvgen_models::{Dimensions, Position};

use crate::error::{MediaError, MediaResult};

/// A fitted text block, centered within its box.
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    /// Wrapped lines, top to bottom
    pub lines: Vec<String>,
    /// Accepted font size in pixels
    pub font_size: f32,
    /// Absolute x of the block's top-left corner
    pub x: f32,
    /// Absolute y of the block's top-left corner
    pub y: f32,
    /// Block width in pixels
    pub width: f32,
    /// Block height in pixels
    pub height: f32,
}

impl TextLayout {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Load a font file for layout and rasterization.
pub fn load_font(path: impl AsRef<Path>) -> MediaResult<Font> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| MediaError::font(format!("cannot read font {}: {}", path.display(), e)))?;
    Font::from_bytes(bytes, FontSettings::default())
        .map_err(|e| MediaError::font(format!("cannot parse font {}: {}", path.display(), e)))
}

/// Fit `text` inside `box_dims`, returning the wrapped block centered at
/// `position`. Never fails: unfittable input returns the floor-size layout
/// of the last attempt, and empty text returns an empty layout.
pub fn layout_text(
    text: &str,
    position: Position,
    box_dims: Dimensions,
    font: &Font,
    initial_font_size: f32,
    max_lines: u32,
) -> TextLayout {
    let text = text.trim();
    if text.is_empty() {
        return TextLayout::default();
    }

    let box_w = box_dims.width as f32;
    let box_h = box_dims.height as f32;
    let char_count = text.chars().count();

    let mut font_size = initial_font_size.max(FONT_SIZE_FLOOR);
    let mut best: Option<(Vec<String>, f32, f32)> = None;

    loop {
        // Character budget derived from a one-line width probe
        let probe_w = measure_width(font, text, font_size).max(1.0);
        let char_limit = ((char_count as f32) * box_w / probe_w).floor().max(1.0) as usize;

        let mut attempt: Option<(Vec<String>, f32, f32)> = None;
        let mut fits = false;
        for line_count in 1..=max_lines.max(1) {
            let per_line = (char_limit / line_count as usize).max(1);
            let lines = wrap_chars(text, per_line);
            let (w, h) = block_size(font, &lines, font_size);
            attempt = Some((lines, w, h));
            if w <= box_w && h <= box_h {
                fits = true;
                break;
            }
        }
        best = attempt;

        if fits || font_size - FONT_SIZE_STEP < FONT_SIZE_FLOOR {
            if !fits {
                warn!(
                    font_size,
                    "text does not fit its box at the floor font size, using best effort"
                );
            }
            break;
        }
        font_size -= FONT_SIZE_STEP;
    }

    let (lines, width, height) = best.unwrap_or_default();
    TextLayout {
        lines,
        font_size,
        x: position.x as f32 + (box_w - width) / 2.0,
        y: position.y as f32 + (box_h - height) / 2.0,
        width,
        height,
    }
}

/// Rendered width of a single line, in pixels.
pub fn measure_width(font: &Font, line: &str, px: f32) -> f32 {
    line.chars().map(|c| font.metrics(c, px).advance_width).sum()
}

/// Line advance height, in pixels.
pub fn line_height(font: &Font, px: f32) -> f32 {
    font.horizontal_line_metrics(px)
        .map(|m| m.new_line_size)
        .unwrap_or(px * 1.2)
}

/// Bounding size of a wrapped block.
fn block_size(font: &Font, lines: &[String], px: f32) -> (f32, f32) {
    let width = lines
        .iter()
        .map(|l| measure_width(font, l, px))
        .fold(0.0f32, f32::max);
    let height = lines.len() as f32 * line_height(font, px);
    (width, height)
}

/// Greedy word wrap with a per-line character budget. Words longer than the
/// budget land on their own line rather than being broken.
pub fn wrap_chars(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    // DejaVu Sans ships with most Linux distributions; skip metric-dependent
    // assertions when no font is available on the host.
    fn test_font() -> Option<Font> {
        let candidates = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        ];
        candidates
            .iter()
            .find(|p| std::path::Path::new(p).exists())
            .and_then(|p| load_font(p).ok())
    }

    #[test]
    fn test_wrap_chars_greedy() {
        assert_eq!(
            wrap_chars("the quick brown fox", 9),
            vec!["the quick", "brown fox"]
        );
        assert_eq!(wrap_chars("one", 10), vec!["one"]);
        assert_eq!(
            wrap_chars("extraordinarily big", 5),
            vec!["extraordinarily", "big"]
        );
        assert!(wrap_chars("", 10).is_empty());
    }

    #[test]
    fn test_empty_text_gives_empty_layout() {
        let Some(font) = test_font() else { return };
        let layout = layout_text(
            "   ",
            Position { x: 0, y: 0 },
            Dimensions {
                width: 100,
                height: 100,
            },
            &font,
            120.0,
            3,
        );
        assert!(layout.is_empty());
    }

    #[test]
    fn test_layout_fits_box_or_reaches_floor() {
        let Some(font) = test_font() else { return };
        let box_dims = Dimensions {
            width: 400,
            height: 160,
        };
        let layout = layout_text(
            "Congratulations on your amazing result",
            Position { x: 50, y: 80 },
            box_dims,
            &font,
            120.0,
            3,
        );
        assert!(!layout.is_empty());
        assert!(layout.font_size >= FONT_SIZE_FLOOR);
        if layout.font_size > FONT_SIZE_FLOOR {
            assert!(layout.width <= box_dims.width as f32);
            assert!(layout.height <= box_dims.height as f32);
        }
    }

    #[test]
    fn test_tiny_box_terminates_at_floor() {
        let Some(font) = test_font() else { return };
        let layout = layout_text(
            "this text can never fit in such a small box no matter what",
            Position { x: 0, y: 0 },
            Dimensions {
                width: 10,
                height: 10,
            },
            &font,
            120.0,
            3,
        );
        // Termination with the floor size is the contract, not a perfect fit
        assert!((layout.font_size - FONT_SIZE_FLOOR).abs() < FONT_SIZE_STEP);
        assert!(!layout.is_empty());
    }

    #[test]
    fn test_block_centered_in_box() {
        let Some(font) = test_font() else { return };
        let layout = layout_text(
            "Hi",
            Position { x: 100, y: 200 },
            Dimensions {
                width: 300,
                height: 100,
            },
            &font,
            40.0,
            3,
        );
        let center_x = layout.x + layout.width / 2.0;
        let center_y = layout.y + layout.height / 2.0;
        assert!((center_x - 250.0).abs() < 1.0);
        assert!((center_y - 250.0).abs() < 1.0);
    }
}
