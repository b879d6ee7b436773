use thiserror::Error;

/// Failure taxonomy for a single recognition request.
///
/// Every variant is terminal for the request it occurs in; the core never
/// retries, and the transport layer decides whether to surface the error or
/// present a soft "no prediction" fallback.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input bytes could not be decoded as an image.
    #[error("failed to decode image bytes: {0}")]
    Decode(#[from] image::ImageError),
    /// The decoded image has zero area in at least one axis.
    #[error("image has zero area ({width}x{height})")]
    EmptyImage {
        /// Decoded width in pixels.
        width: u32,
        /// Decoded height in pixels.
        height: u32,
    },
    /// The requested top-k is zero or exceeds the number of class scores.
    #[error("invalid top-k {k} for a probability vector of length {len}")]
    InvalidK {
        /// The requested number of ranked entries.
        k: usize,
        /// The length of the probability vector.
        len: usize,
    },
    /// The probability vector has no entries.
    #[error("probability vector is empty")]
    EmptyVector,
    /// The external classifier failed or produced malformed output.
    #[error("classifier failure: {0}")]
    Classifier(String),
}
