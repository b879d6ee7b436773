//! Core digit recognition primitives.
//!
//! This crate normalizes arbitrary input images into the fixed tensor format
//! expected by a pre-trained MNIST-style classifier, runs inference with
//! `tract-onnx`, and ranks the raw class scores into a top-k result.

/// Typed failure taxonomy for a single recognition request.
pub mod error;
/// ONNX model loading and execution.
pub mod model;
/// Score ranking (top-k selection, confidence percentages).
pub mod postprocess;
/// Image normalization (grayscale, polarity, resize, tensor conversion).
pub mod preprocess;
/// High-level recognition runner.
pub mod recognizer;

pub use error::PipelineError;
pub use model::{Classifier, DigitModel, NUM_CLASSES};
pub use postprocess::{RankConfig, RankedDigit, rank_probabilities};
pub use preprocess::{
    MODEL_INPUT_SIZE, PreprocessConfig, PreprocessOutput, normalize_bytes, normalize_image,
};
pub use recognizer::{DigitRecognizer, Recognition};

/// Returns the crate version for diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
