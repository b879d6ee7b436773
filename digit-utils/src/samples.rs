//! In-memory sample images used by tests across the workspace.
//!
//! These builders stand in for user-supplied uploads and drawing-canvas
//! buffers, so tests never depend on binary fixture files.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

/// Background shade for light (paper-like) sample images.
const LIGHT_BG: u8 = 245;
/// Stroke shade for dark strokes.
const DARK_INK: u8 = 20;

/// Build an RGB image with a thick dark vertical stroke on a light background,
/// resembling an uploaded photo of a handwritten "1".
pub fn dark_stroke_on_light(width: u32, height: u32) -> DynamicImage {
    let mut image = RgbImage::from_pixel(width, height, Rgb([LIGHT_BG, LIGHT_BG, LIGHT_BG]));
    paint_vertical_stroke(width, height, |x, y| {
        image.put_pixel(x, y, Rgb([DARK_INK, DARK_INK, DARK_INK]));
    });
    DynamicImage::ImageRgb8(image)
}

/// Build an RGBA image with a bright stroke on black, resembling a
/// drawing-canvas pixel buffer that already matches the training polarity.
pub fn light_stroke_on_dark(width: u32, height: u32) -> DynamicImage {
    let mut image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
    paint_vertical_stroke(width, height, |x, y| {
        image.put_pixel(x, y, Rgba([255, 255, 255, 255]));
    });
    DynamicImage::ImageRgba8(image)
}

/// Build a uniformly shaded grayscale image.
pub fn flat_gray(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value])))
}

/// Paint a centered vertical stroke spanning the middle two thirds of the
/// image, about one eighth of the width thick.
fn paint_vertical_stroke(width: u32, height: u32, mut put: impl FnMut(u32, u32)) {
    let stroke = (width / 8).max(1);
    let x0 = width.saturating_sub(stroke) / 2;
    let y0 = height / 6;
    let y1 = height.saturating_sub(height / 6).max(y0 + 1);
    for y in y0..y1 {
        for x in x0..(x0 + stroke).min(width) {
            put(x, y);
        }
    }
}
