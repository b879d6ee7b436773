//! Normalization of arbitrary input images into the classifier input tensor.
//!
//! The helpers in this module collapse an image to a single channel, apply the
//! one canonical polarity inversion, resize to the model resolution with a
//! fixed resampling kernel, and stage the result as an NHWC float tensor.

use image::{DynamicImage, GenericImageView, imageops};
use log::Level;
use tract_onnx::prelude::Tensor;

use digit_utils::{
    SourcePolarity,
    image_utils::{luma_to_scaled_nhwc, resize_luma},
    timing_guard,
};

use crate::error::PipelineError;

/// Side length of the square single-channel input the classifier expects.
pub const MODEL_INPUT_SIZE: u32 = 28;

/// Configuration for normalizing an image before inference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreprocessConfig {
    /// Polarity convention of the source image. Dark-on-light sources are
    /// inverted once to match the bright-on-dark training convention;
    /// light-on-dark sources pass through untouched.
    pub polarity: SourcePolarity,
}

/// Output of normalization: tensor plus metadata about the source image.
#[derive(Debug)]
pub struct PreprocessOutput {
    /// The normalized `[1, 28, 28, 1]` tensor, values in `[0.0, 1.0]`.
    pub tensor: Tensor,
    /// The original dimensions of the input image.
    pub original_size: (u32, u32),
}

/// Decode raw image bytes and normalize them into a classifier-ready tensor.
///
/// # Arguments
///
/// * `bytes` - Encoded image bytes (PNG, JPEG, BMP, ...).
/// * `config` - The configuration for normalization.
pub fn normalize_bytes(
    bytes: &[u8],
    config: &PreprocessConfig,
) -> Result<PreprocessOutput, PipelineError> {
    let _guard = timing_guard("digit_core::normalize_bytes", Level::Debug);
    let image = image::load_from_memory(bytes)?;
    normalize_image(&image, config)
}

/// Normalize an already-decoded image into a classifier-ready tensor.
///
/// The transform is total for any decoded image with non-zero area: collapse
/// to luminance, invert at most once per [`PreprocessConfig::polarity`],
/// resize to 28x28 with the fixed `Triangle` kernel, and scale to `[0, 1]`.
///
/// # Arguments
///
/// * `image` - The dynamic image to normalize. Never mutated or retained.
/// * `config` - The configuration for normalization.
pub fn normalize_image(
    image: &DynamicImage,
    config: &PreprocessConfig,
) -> Result<PreprocessOutput, PipelineError> {
    let _guard = timing_guard("digit_core::normalize_image", Level::Trace);

    let (orig_w, orig_h) = image.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return Err(PipelineError::EmptyImage {
            width: orig_w,
            height: orig_h,
        });
    }

    let mut luma = image.to_luma8();
    // The single inversion in the whole pipeline.
    if config.polarity == SourcePolarity::DarkOnLight {
        imageops::invert(&mut luma);
    }

    let resized = if luma.dimensions() == (MODEL_INPUT_SIZE, MODEL_INPUT_SIZE) {
        luma
    } else {
        resize_luma(&luma, MODEL_INPUT_SIZE, MODEL_INPUT_SIZE)
    };

    let scaled = luma_to_scaled_nhwc(&resized);
    let shape = [
        1usize,
        MODEL_INPUT_SIZE as usize,
        MODEL_INPUT_SIZE as usize,
        1,
    ];
    let (data, offset) = scaled.into_raw_vec_and_offset();
    debug_assert_eq!(offset, Some(0), "expected contiguous array");
    let tensor = Tensor::from_shape(&shape, &data)
        .map_err(|e| PipelineError::Classifier(format!("failed to build input tensor: {e}")))?;

    Ok(PreprocessOutput {
        tensor,
        original_size: (orig_w, orig_h),
    })
}
