//! Animated border rendering.
//!
//! The border draws clockwise around an expanded overlay box, one side per
//! quarter of the draw duration, then holds static. Frames are written as a
//! transparent PNG sequence; the composer pads the last frame with `tpad`
//! to cover the rest of the overlay's lifespan.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

use pvgen_models::encoding::BORDER_MARGIN_PX;
use pvgen_models::{AnimatedBorderSpec, Dimensions, Position};

use crate::error::MediaResult;

/// A rendered border frame sequence on disk.
#[derive(Debug, Clone)]
pub struct BorderSequence {
    /// ffmpeg input pattern, e.g. `.../border_%04d.png`
    pub pattern: PathBuf,
    /// Number of frames written
    pub frame_count: u32,
    /// Absolute x of the sequence's top-left corner
    pub x: i32,
    /// Absolute y of the sequence's top-left corner
    pub y: i32,
}

/// Render the draw animation for one overlay's border into `dir`.
pub fn render_border_sequence(
    dir: impl AsRef<Path>,
    position: Position,
    dimensions: Dimensions,
    spec: &AnimatedBorderSpec,
    fps: u32,
) -> MediaResult<BorderSequence> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let margin = BORDER_MARGIN_PX;
    let width = dimensions.width + 2 * margin;
    let height = dimensions.height + 2 * margin;

    let frame_count = ((spec.duration * fps as f64).ceil() as u32).max(1);
    for frame in 0..frame_count {
        // Last frame is the fully drawn border
        let progress = (frame + 1) as f64 / frame_count as f64;
        let img = border_frame(width, height, spec.line_width, spec.color, progress);
        let path = dir.join(format!("border_{:04}.png", frame));
        img.save(&path)?;
    }

    Ok(BorderSequence {
        pattern: dir.join("border_%04d.png"),
        frame_count,
        x: position.x - margin as i32,
        y: position.y - margin as i32,
    })
}

/// Draw one frame of the border at `progress` in [0, 1].
///
/// Sides complete at 25% increments: top, right, bottom, left.
pub fn border_frame(
    width: u32,
    height: u32,
    line_width: u32,
    color: [u8; 3],
    progress: f64,
) -> RgbaImage {
    let mut img = RgbaImage::new(width.max(1), height.max(1));
    let lw = line_width.max(1);
    let progress = progress.clamp(0.0, 1.0);

    let side = |p: f64, start: f64| ((p - start) / 0.25).clamp(0.0, 1.0);

    // Top edge, left to right
    let len = (width as f64 * side(progress, 0.0)) as u32;
    fill_rect(&mut img, 0, 0, len, lw, color);
    if progress >= 0.25 {
        // Right edge, top to bottom
        let len = (height as f64 * side(progress, 0.25)) as u32;
        fill_rect(&mut img, width.saturating_sub(lw), 0, lw, len, color);
    }
    if progress >= 0.5 {
        // Bottom edge, right to left
        let len = (width as f64 * side(progress, 0.5)) as u32;
        fill_rect(
            &mut img,
            width.saturating_sub(len),
            height.saturating_sub(lw),
            len,
            lw,
            color,
        );
    }
    if progress >= 0.75 {
        // Left edge, bottom to top
        let len = (height as f64 * side(progress, 0.75)) as u32;
        fill_rect(&mut img, 0, height.saturating_sub(len), lw, len, color);
    }
    img
}

fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
    let x_end = (x + w).min(img.width());
    let y_end = (y + h).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, Rgba([color[0], color[1], color[2], 255]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 3] = [255, 255, 255];

    fn alpha_at(img: &RgbaImage, x: u32, y: u32) -> u8 {
        img.get_pixel(x, y).0[3]
    }

    #[test]
    fn test_quarter_progress_draws_only_top() {
        let img = border_frame(100, 60, 4, WHITE, 0.25);
        assert_eq!(alpha_at(&img, 50, 0), 255); // top
        assert_eq!(alpha_at(&img, 99, 30), 0); // right not yet
        assert_eq!(alpha_at(&img, 50, 59), 0); // bottom not yet
    }

    #[test]
    fn test_half_progress_adds_right_edge() {
        let img = border_frame(100, 60, 4, WHITE, 0.5);
        assert_eq!(alpha_at(&img, 50, 0), 255);
        assert_eq!(alpha_at(&img, 99, 59), 255); // right fully drawn
        assert_eq!(alpha_at(&img, 50, 59), 0);
    }

    #[test]
    fn test_full_progress_closes_the_box() {
        let img = border_frame(100, 60, 4, WHITE, 1.0);
        assert_eq!(alpha_at(&img, 50, 0), 255);
        assert_eq!(alpha_at(&img, 99, 30), 255);
        assert_eq!(alpha_at(&img, 50, 59), 255);
        assert_eq!(alpha_at(&img, 0, 30), 255);
        // Interior stays transparent
        assert_eq!(alpha_at(&img, 50, 30), 0);
    }

    #[test]
    fn test_sequence_expands_box_by_margin() {
        let dir = tempfile::tempdir().unwrap();
        let seq = render_border_sequence(
            dir.path(),
            Position { x: 100, y: 200 },
            Dimensions {
                width: 40,
                height: 20,
            },
            &AnimatedBorderSpec {
                enabled: true,
                color: WHITE,
                line_width: 2,
                duration: 0.5,
            },
            24,
        )
        .unwrap();
        assert_eq!(seq.x, 100 - BORDER_MARGIN_PX as i32);
        assert_eq!(seq.y, 200 - BORDER_MARGIN_PX as i32);
        assert_eq!(seq.frame_count, 12);
        assert!(dir.path().join("border_0000.png").exists());
        assert!(dir.path().join("border_0011.png").exists());
    }
}
