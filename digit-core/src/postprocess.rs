//! Ranking of raw class scores into a stable top-k result.

use std::cmp::Ordering;

use crate::error::PipelineError;

/// Configuration for ranking class scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankConfig {
    /// The number of candidate digits to return, highest confidence first.
    pub top_k: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

/// A candidate digit paired with its confidence percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedDigit {
    /// The class label (0-9 for digits).
    pub label: usize,
    /// Confidence as a percentage, rounded to two decimal places.
    pub confidence: f32,
}

/// Select the `top_k` highest-scoring classes from a probability vector.
///
/// Scores are treated as relative values and need not sum to 1. The ordering
/// is a deterministic function of the input: descending by score, and exact
/// ties resolve to the lower class index.
///
/// # Arguments
///
/// * `probs` - One score per class, index = class label.
/// * `top_k` - How many entries to return; must be in `1..=probs.len()`.
pub fn rank_probabilities(
    probs: &[f32],
    top_k: usize,
) -> Result<Vec<RankedDigit>, PipelineError> {
    if probs.is_empty() {
        return Err(PipelineError::EmptyVector);
    }
    if top_k == 0 || top_k > probs.len() {
        return Err(PipelineError::InvalidK {
            k: top_k,
            len: probs.len(),
        });
    }

    let mut order: Vec<usize> = (0..probs.len()).collect();
    order.sort_by(|&a, &b| {
        probs[b]
            .partial_cmp(&probs[a])
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });
    order.truncate(top_k);

    Ok(order
        .into_iter()
        .map(|label| RankedDigit {
            label,
            confidence: to_percentage(probs[label]),
        })
        .collect())
}

/// Scale a `[0, 1]` score to a percentage rounded to two decimal places.
fn to_percentage(score: f32) -> f32 {
    (score * 10_000.0).round() / 100.0
}
