//! Text measurement and glyph drawing.
//!
//! Wrapping is greedy and character-based: a run grows one character at a
//! time and the last prefix that still fit is emitted when the run outgrows
//! the content box. Paragraphs come from literal newlines and are followed
//! by one extra line-height gap.

use fontdue::Font;
use image::RgbaImage;

pub(crate) fn line_height(font: &Font, px: f32) -> f32 {
    font.horizontal_line_metrics(px)
        .map(|m| m.new_line_size)
        .unwrap_or(px * 1.2)
}

fn ascent(font: &Font, px: f32) -> f32 {
    font.horizontal_line_metrics(px)
        .map(|m| m.ascent)
        .unwrap_or(px * 0.8)
}

fn line_width(font: &Font, px: f32, line: &str) -> f32 {
    line.chars().map(|c| font.metrics(c, px).advance_width).sum()
}

/// Splits one paragraph into lines that fit `max_width` pixels.
///
/// Lines are trimmed before measuring. A single glyph wider than the box is
/// emitted on its own line rather than wrapped forever. An empty paragraph
/// yields one empty line so it still advances the pen.
fn wrap_paragraph(font: &Font, px: f32, para: &str, max_width: f32) -> Vec<String> {
    let chars: Vec<char> = para.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    let mut lines = Vec::new();
    let mut min_idx = 0;
    let mut max_idx = 1;
    let mut last_line = String::new();
    loop {
        let candidate: String = chars[min_idx..max_idx].iter().collect();
        let candidate = candidate.trim().to_string();
        let width = line_width(font, px, &candidate);
        if width > max_width && max_idx - min_idx > 1 {
            lines.push(std::mem::take(&mut last_line));
            min_idx = max_idx - 1;
            continue;
        }
        if max_idx == chars.len() {
            lines.push(candidate);
            break;
        }
        last_line = candidate;
        max_idx += 1;
    }
    lines
}

/// Measures wrapped text against a width hint, in pixels.
///
/// Empty text measures to (0, 0). Identical inputs always measure
/// identically; there is no cache or rounding state behind this.
pub(crate) fn measure(font: &Font, px: f32, text: &str, max_width: f32) -> (f32, f32) {
    if text.is_empty() {
        return (0.0, 0.0);
    }
    let lh = line_height(font, px);
    let mut widest: f32 = 0.0;
    let mut height: f32 = 0.0;
    for para in text.split('\n') {
        for line in wrap_paragraph(font, px, para, max_width) {
            widest = widest.max(line_width(font, px, &line));
            height += lh;
        }
        height += lh;
    }
    (widest, height)
}

/// Draws wrapped text in opaque black with the content box's top-left at
/// (`left`, `top`). Overflow below the box is not clipped.
pub(crate) fn draw(
    font: &Font,
    px: f32,
    text: &str,
    left: i32,
    top: i32,
    max_width: f32,
    canvas: &mut RgbaImage,
) {
    if text.is_empty() {
        return;
    }
    let lh = line_height(font, px);
    let mut baseline = top as f32 + ascent(font, px);
    for para in text.split('\n') {
        for line in wrap_paragraph(font, px, para, max_width) {
            draw_line(font, px, &line, left, baseline.round() as i32, canvas);
            baseline += lh;
        }
        baseline += lh;
    }
}

fn draw_line(font: &Font, px: f32, line: &str, left: i32, baseline: i32, canvas: &mut RgbaImage) {
    let mut pen = left as f32;
    for ch in line.chars() {
        let (metrics, coverage) = font.rasterize(ch, px);
        let gx = pen.round() as i32 + metrics.xmin;
        let gy = baseline - metrics.ymin - metrics.height as i32;
        for (i, &alpha) in coverage.iter().enumerate() {
            if alpha == 0 {
                continue;
            }
            let x = gx + (i % metrics.width) as i32;
            let y = gy + (i / metrics.width) as i32;
            blend_black(canvas, x, y, alpha);
        }
        pen += metrics.advance_width;
    }
}

fn blend_black(canvas: &mut RgbaImage, x: i32, y: i32, alpha: u8) {
    if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
        return;
    }
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    let keep = (255 - alpha) as u16;
    pixel[0] = (pixel[0] as u16 * keep / 255) as u8;
    pixel[1] = (pixel[1] as u16 * keep / 255) as u8;
    pixel[2] = (pixel[2] as u16 * keep / 255) as u8;
    pixel[3] = 255;
}
