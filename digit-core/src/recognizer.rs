use std::path::Path;

use anyhow::Result;
use image::DynamicImage;
use log::Level;

use digit_utils::timing_guard;

use crate::error::PipelineError;
use crate::model::{Classifier, DigitModel};
use crate::postprocess::{RankConfig, RankedDigit, rank_probabilities};
use crate::preprocess::{PreprocessConfig, PreprocessOutput, normalize_bytes, normalize_image};

/// Result of recognizing a single image.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    /// The top-k candidate digits, highest confidence first.
    pub digits: Vec<RankedDigit>,
    /// The original dimensions of the input image.
    pub original_size: (u32, u32),
}

/// Convenience wrapper that couples a classifier with normalization and
/// ranking settings.
///
/// This is the main entry point for recognizing digits. Each call is an
/// independent, stateless invocation; a recognizer behind an `Arc` can serve
/// concurrent requests because the classifier handle is read-only.
#[derive(Debug)]
pub struct DigitRecognizer<C = DigitModel> {
    classifier: C,
    preprocess: PreprocessConfig,
    rank: RankConfig,
}

impl DigitRecognizer<DigitModel> {
    /// Construct a recognizer by loading the ONNX model at `model_path`.
    ///
    /// # Arguments
    ///
    /// * `model_path` - The path to the ONNX model file.
    /// * `preprocess` - The configuration for image normalization.
    /// * `rank` - The configuration for score ranking.
    pub fn from_model_path<P: AsRef<Path>>(
        model_path: P,
        preprocess: PreprocessConfig,
        rank: RankConfig,
    ) -> Result<Self> {
        let model = DigitModel::load(model_path)?;
        Ok(Self::new(model, preprocess, rank))
    }
}

impl<C: Classifier> DigitRecognizer<C> {
    /// Construct a recognizer around an existing classifier handle.
    pub fn new(classifier: C, preprocess: PreprocessConfig, rank: RankConfig) -> Self {
        Self {
            classifier,
            preprocess,
            rank,
        }
    }

    /// Access the normalization configuration.
    pub fn preprocess_config(&self) -> &PreprocessConfig {
        &self.preprocess
    }

    /// Access the ranking configuration.
    pub fn rank_config(&self) -> &RankConfig {
        &self.rank
    }

    /// Recognize the digit in raw encoded image bytes.
    ///
    /// Performs decode, normalization, classifier inference, and ranking as
    /// one synchronous request-response sequence.
    pub fn recognize_bytes(&self, bytes: &[u8]) -> Result<Recognition, PipelineError> {
        let _guard = timing_guard("digit_core::recognize_bytes", Level::Debug);
        let prep = normalize_bytes(bytes, &self.preprocess)?;
        self.run_normalized(prep)
    }

    /// Recognize the digit in an already-decoded image.
    pub fn recognize_image(&self, image: &DynamicImage) -> Result<Recognition, PipelineError> {
        let _guard = timing_guard("digit_core::recognize_image", Level::Debug);
        let prep = normalize_image(image, &self.preprocess)?;
        self.run_normalized(prep)
    }

    /// Run the classifier on a normalized tensor and rank its scores.
    fn run_normalized(&self, prep: PreprocessOutput) -> Result<Recognition, PipelineError> {
        let probs = {
            let _guard = timing_guard("digit_core::inference", Level::Debug);
            self.classifier.predict(&prep.tensor)?
        };

        let digits = {
            let _guard = timing_guard("digit_core::rank", Level::Trace);
            rank_probabilities(&probs, self.rank.top_k)?
        };

        Ok(Recognition {
            digits,
            original_size: prep.original_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digit_utils::samples::dark_stroke_on_light;
    use tract_onnx::prelude::Tensor;

    #[derive(Debug)]
    struct FixedClassifier {
        scores: Vec<f32>,
    }

    impl Classifier for FixedClassifier {
        fn predict(&self, input: &Tensor) -> Result<Vec<f32>, PipelineError> {
            assert_eq!(input.shape(), &[1, 28, 28, 1]);
            Ok(self.scores.clone())
        }
    }

    #[derive(Debug)]
    struct FaultyClassifier;

    impl Classifier for FaultyClassifier {
        fn predict(&self, _input: &Tensor) -> Result<Vec<f32>, PipelineError> {
            Err(PipelineError::Classifier("backend fault".into()))
        }
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn recognizer_is_shareable_across_threads() {
        assert_send_sync::<DigitRecognizer<FixedClassifier>>();
    }

    #[test]
    fn recognize_image_ranks_classifier_scores() {
        let classifier = FixedClassifier {
            scores: vec![0.05, 0.02, 0.01, 0.85, 0.01, 0.01, 0.01, 0.02, 0.01, 0.01],
        };
        let recognizer =
            DigitRecognizer::new(classifier, PreprocessConfig::default(), RankConfig::default());

        let recognition = recognizer
            .recognize_image(&dark_stroke_on_light(100, 140))
            .expect("recognition should succeed");

        assert_eq!(recognition.original_size, (100, 140));
        let labels: Vec<usize> = recognition.digits.iter().map(|d| d.label).collect();
        assert_eq!(labels, vec![3, 0, 1]);
        assert_eq!(recognition.digits[0].confidence, 85.0);
    }

    #[test]
    fn classifier_errors_propagate() {
        let recognizer = DigitRecognizer::new(
            FaultyClassifier,
            PreprocessConfig::default(),
            RankConfig::default(),
        );
        let err = recognizer
            .recognize_image(&dark_stroke_on_light(64, 64))
            .expect_err("faulty classifier must fail");
        assert!(matches!(err, PipelineError::Classifier(_)));
    }

    #[test]
    fn decode_errors_propagate_from_bytes_entry_point() {
        let recognizer = DigitRecognizer::new(
            FixedClassifier {
                scores: vec![0.1; 10],
            },
            PreprocessConfig::default(),
            RankConfig::default(),
        );
        let err = recognizer
            .recognize_bytes(b"garbage")
            .expect_err("garbage bytes must fail");
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn invalid_rank_config_is_reported() {
        let recognizer = DigitRecognizer::new(
            FixedClassifier {
                scores: vec![0.1; 10],
            },
            PreprocessConfig::default(),
            RankConfig { top_k: 11 },
        );
        let err = recognizer
            .recognize_image(&dark_stroke_on_light(64, 64))
            .expect_err("top_k beyond class count must fail");
        assert!(matches!(err, PipelineError::InvalidK { k: 11, len: 10 }));
    }
}
