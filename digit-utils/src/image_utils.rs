use image::{GrayImage, imageops::FilterType};
use ndarray::Array4;

/// Resize a grayscale image to the requested resolution.
///
/// Always uses the `Triangle` (bilinear) kernel so repeated runs over the same
/// input produce bit-identical output.
///
/// # Arguments
///
/// * `image` - The grayscale image to resize.
/// * `width` - The target width.
/// * `height` - The target height.
pub fn resize_luma(image: &GrayImage, width: u32, height: u32) -> GrayImage {
    image::imageops::resize(image, width, height, FilterType::Triangle)
}

/// Convert a grayscale image into an NHWC `[1, H, W, 1]` array with values
/// scaled from `[0, 255]` to `[0.0, 1.0]`.
///
/// # Arguments
///
/// * `image` - The grayscale image to convert.
pub fn luma_to_scaled_nhwc(image: &GrayImage) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let mut array = Array4::<f32>::zeros((1, height as usize, width as usize, 1));
    for (x, y, pixel) in image.enumerate_pixels() {
        array[(0, y as usize, x as usize, 0)] = pixel.0[0] as f32 / 255.0;
    }
    array
}
