//! Image placement: aspect-preserving fit, Lanczos scaling, and
//! error-diffusion dithering down to the panel's two inks.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

/// Error-diffusion kernel selection.
///
/// Atkinson deliberately diffuses only 6/8 of the error, which gives the
/// high-contrast look that suits e-paper; the other two kernels are kept
/// for callers that prefer softer gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitherKernel {
    #[default]
    Atkinson,
    SierraLite,
    FloydSteinberg,
}

impl DitherKernel {
    /// (dx, dy, weight) taps receiving the quantization error.
    fn taps(self) -> &'static [(i32, i32, f32)] {
        match self {
            DitherKernel::Atkinson => &[
                (1, 0, 1.0 / 8.0),
                (2, 0, 1.0 / 8.0),
                (-1, 1, 1.0 / 8.0),
                (0, 1, 1.0 / 8.0),
                (1, 1, 1.0 / 8.0),
                (0, 2, 1.0 / 8.0),
            ],
            DitherKernel::SierraLite => &[
                (1, 0, 2.0 / 4.0),
                (-1, 1, 1.0 / 4.0),
                (0, 1, 1.0 / 4.0),
            ],
            DitherKernel::FloydSteinberg => &[
                (1, 0, 7.0 / 48.0),
                (2, 0, 5.0 / 48.0),
                (-2, 1, 3.0 / 48.0),
                (-1, 1, 5.0 / 48.0),
                (0, 1, 7.0 / 48.0),
                (1, 1, 5.0 / 48.0),
                (2, 1, 3.0 / 48.0),
                (-2, 2, 1.0 / 48.0),
                (-1, 2, 3.0 / 48.0),
                (0, 2, 5.0 / 48.0),
                (1, 2, 3.0 / 48.0),
                (2, 2, 1.0 / 48.0),
            ],
        }
    }
}

/// BT.601 luma of an RGBA pixel.
pub(crate) fn luma(pixel: &Rgba<u8>) -> u32 {
    let [r, g, b, _] = pixel.0;
    (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000
}

/// Reduces an image to black/white by scanning row-major and diffusing the
/// threshold error to the kernel taps, scaled by `strength`. The error
/// buffer is clamped to the image bounds.
pub(crate) fn monochrome(source: &RgbaImage, kernel: DitherKernel, strength: f32) -> GrayImage {
    let (w, h) = source.dimensions();
    let mut values: Vec<f32> = source.pixels().map(|p| luma(p) as f32).collect();

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let idx = (y * w as i32 + x) as usize;
            let old = values[idx];
            let new = if old < 128.0 { 0.0 } else { 255.0 };
            values[idx] = new;
            let err = old - new;
            for &(dx, dy, weight) in kernel.taps() {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                    continue;
                }
                values[(ny * w as i32 + nx) as usize] += err * weight * strength;
            }
        }
    }

    GrayImage::from_fn(w, h, |x, y| {
        Luma([values[(y * w + x) as usize].clamp(0.0, 255.0) as u8])
    })
}

/// Uniform-scale dimensions that fit `(w, h)` entirely inside `(tw, th)`.
pub(crate) fn fit(w: u32, h: u32, tw: u32, th: u32) -> (u32, u32) {
    let (wf, hf) = (w as f64, h as f64);
    let (twf, thf) = (tw as f64, th as f64);
    let scaled_height = hf * twf / wf;
    let scaled_width = wf * thf / hf;
    if scaled_height <= thf {
        (tw, scaled_height as u32)
    } else if scaled_width <= twf {
        (scaled_width as u32, th)
    } else {
        (tw, th)
    }
}

/// Draws `source` into the content box at (`left`, `top`) sized
/// (`tw`, `th`): scaled uniformly to fit, centered, Lanczos-resampled,
/// dithered bi-level, and blitted opaquely.
pub(crate) fn draw(
    source: &DynamicImage,
    kernel: DitherKernel,
    left: i32,
    top: i32,
    tw: i32,
    th: i32,
    canvas: &mut RgbaImage,
) {
    if tw <= 0 || th <= 0 || source.width() == 0 || source.height() == 0 {
        return;
    }
    let (rw, rh) = fit(source.width(), source.height(), tw as u32, th as u32);
    if rw == 0 || rh == 0 {
        return;
    }
    log::debug!("scaling {}x{} image to {rw}x{rh}", source.width(), source.height());

    let resized = imageops::resize(&source.to_rgba8(), rw, rh, FilterType::Lanczos3);
    let mono = monochrome(&resized, kernel, 0.3);

    let x_offset = left + tw / 2 - rw as i32 / 2;
    let y_offset = top + th / 2 - rh as i32 / 2;
    for (px, py, value) in mono.enumerate_pixels() {
        let x = x_offset + px as i32;
        let y = y_offset + py as i32;
        if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
            continue;
        }
        let ink = value.0[0];
        canvas.put_pixel(x as u32, y as u32, Rgba([ink, ink, ink, 255]));
    }
}
