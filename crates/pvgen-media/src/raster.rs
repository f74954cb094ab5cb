//! Overlay text rasterization.
//!
//! Turns a fitted [`TextLayout`] into a transparent RGBA image the size of
//! its overlay box; the composer feeds these PNGs to ffmpeg as inputs.

use fontdue::Font;
use image::{Rgba, RgbaImage};

use pvgen_models::encoding::DEFAULT_TEXT_COLOR;
use pvgen_models::Dimensions;

use crate::layout::{line_height, measure_width, TextLayout};

/// Parse a `#RRGGBB` color, falling back to the default overlay color.
pub fn parse_hex_color(color: &str) -> [u8; 3] {
    fn parse(s: &str) -> Option<[u8; 3]> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some([r, g, b])
    }
    parse(color).unwrap_or_else(|| parse(DEFAULT_TEXT_COLOR).unwrap())
}

/// Render a fitted layout into a transparent image of the overlay box size.
///
/// Lines are centered horizontally; the block is centered vertically, which
/// matches the offsets already computed by the layout engine.
pub fn render_text_image(
    layout: &TextLayout,
    font: &Font,
    color: [u8; 3],
    box_dims: Dimensions,
) -> RgbaImage {
    let mut img = RgbaImage::new(box_dims.width.max(1), box_dims.height.max(1));
    if layout.is_empty() {
        return img;
    }

    let px = layout.font_size;
    let lh = line_height(font, px);
    let ascent = font
        .horizontal_line_metrics(px)
        .map(|m| m.ascent)
        .unwrap_or(px * 0.8);
    let block_top = (box_dims.height as f32 - layout.height) / 2.0;

    for (i, line) in layout.lines.iter().enumerate() {
        let line_w = measure_width(font, line, px);
        let mut pen_x = (box_dims.width as f32 - line_w) / 2.0;
        let baseline = block_top + i as f32 * lh + ascent;
        for c in line.chars() {
            let (metrics, bitmap) = font.rasterize(c, px);
            let glyph_x = pen_x + metrics.xmin as f32;
            let glyph_y = baseline - (metrics.height as i32 + metrics.ymin) as f32;
            blit_coverage(&mut img, &bitmap, metrics.width, glyph_x, glyph_y, color);
            pen_x += metrics.advance_width;
        }
    }
    img
}

/// Translucent red fill used by debug mode to visualize overlay boxes.
pub fn render_debug_box(box_dims: Dimensions) -> RgbaImage {
    let mut img = RgbaImage::new(box_dims.width.max(1), box_dims.height.max(1));
    for pixel in img.pixels_mut() {
        *pixel = Rgba([255, 0, 0, 76]);
    }
    img
}

/// Blend a glyph coverage bitmap into the image at the given position.
fn blit_coverage(
    img: &mut RgbaImage,
    bitmap: &[u8],
    bitmap_width: usize,
    x: f32,
    y: f32,
    color: [u8; 3],
) {
    if bitmap_width == 0 {
        return;
    }
    let (img_w, img_h) = (img.width() as i64, img.height() as i64);
    for (idx, &coverage) in bitmap.iter().enumerate() {
        if coverage == 0 {
            continue;
        }
        let px = x as i64 + (idx % bitmap_width) as i64;
        let py = y as i64 + (idx / bitmap_width) as i64;
        if px < 0 || py < 0 || px >= img_w || py >= img_h {
            continue;
        }
        let pixel = img.get_pixel_mut(px as u32, py as u32);
        let alpha = coverage.max(pixel.0[3]);
        *pixel = Rgba([color[0], color[1], color[2], alpha]);
    }
}
