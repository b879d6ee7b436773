use std::{fmt::Write, path::Path};

use anyhow::{Context, Result};
use log::{debug, warn};
use tract_onnx::prelude::{
    Framework, Graph, InferenceModelExt, IntoTensor, SimplePlan, Tensor, TypedFact, TypedOp, tvec,
};

use crate::error::PipelineError;

type RunnablePlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Number of digit classes (0-9) the classifier scores.
pub const NUM_CLASSES: usize = 10;

/// Read-only classifier interface consumed by the pipeline.
///
/// Implementations must be safe to share across threads; the pipeline holds a
/// single handle and never mutates it. Any backend fault surfaces as
/// [`PipelineError::Classifier`] and is never retried here.
pub trait Classifier: Send + Sync {
    /// Score a normalized `[1, 28, 28, 1]` tensor into one value per class.
    fn predict(&self, input: &Tensor) -> Result<Vec<f32>, PipelineError>;
}

/// Wrapper around the digit classifier ONNX runnable plan.
///
/// This struct handles loading the ONNX graph, preparing it for execution,
/// and running inference. Loaded once at startup and shared read-only across
/// requests.
#[derive(Debug)]
pub struct DigitModel {
    runnable: RunnablePlan,
}

impl DigitModel {
    /// Load and optimize the classifier ONNX graph.
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let path = model_path.as_ref();
        anyhow::ensure!(path.exists(), "model file not found: {}", path.display());

        let runnable = match load_runnable_plan(path, true) {
            Ok(plan) => {
                debug!("digit model {} optimized successfully", path.display());
                plan
            }
            Err(opt_err) => {
                let optimize_msg = format!("{opt_err}");
                let mut chain_msg = String::new();
                for cause in opt_err.chain() {
                    let _ = writeln!(&mut chain_msg, "  - {cause}");
                }
                warn!(
                    "digit model {} failed optimized load ({}); falling back to decluttered graph.\nError chain:\n{}",
                    path.display(),
                    optimize_msg,
                    chain_msg.trim_end()
                );
                let decluttered = load_runnable_plan(path, false).with_context(|| {
                    format!(
                        "fallback to decluttered digit graph failed after optimize error: {optimize_msg}"
                    )
                })?;
                debug!("digit model {} running in decluttered mode", path.display());
                decluttered
            }
        };

        Ok(Self { runnable })
    }
}

impl Classifier for DigitModel {
    fn predict(&self, input: &Tensor) -> Result<Vec<f32>, PipelineError> {
        let outputs = self
            .runnable
            .run(tvec![input.clone().into()])
            .map_err(|e| PipelineError::Classifier(format!("model execution failed: {e}")))?;

        let output = outputs
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Classifier("model produced no outputs".into()))?
            .into_tensor();

        probabilities_from_output(&output)
    }
}

fn load_runnable_plan(path: &Path, optimized: bool) -> Result<RunnablePlan> {
    let model = tract_onnx::onnx()
        .model_for_path(path)
        .with_context(|| format!("failed to parse ONNX graph from {}", path.display()))?;

    if optimized {
        model
            .into_optimized()
            .map_err(|e| anyhow::anyhow!("unable to optimize digit graph: {e}"))?
            .into_runnable()
            .map_err(|e| anyhow::anyhow!("unable to make digit graph runnable: {e}"))
    } else {
        model
            .into_typed()
            .map_err(|e| anyhow::anyhow!("unable to type-check digit graph: {e}"))?
            .into_decluttered()
            .map_err(|e| anyhow::anyhow!("unable to declutter digit graph: {e}"))?
            .into_runnable()
            .map_err(|e| anyhow::anyhow!("unable to make digit graph runnable: {e}"))
    }
}

/// Extract the per-class score vector from the model's output tensor.
///
/// Accepts `[10]` or `[1, 10]` shaped f32 output; anything else is a
/// classifier contract violation.
pub(crate) fn probabilities_from_output(output: &Tensor) -> Result<Vec<f32>, PipelineError> {
    let len = match output.shape() {
        [n] => *n,
        [1, n] => *n,
        other => {
            return Err(PipelineError::Classifier(format!(
                "unexpected output shape {other:?} (expected [{NUM_CLASSES}] or [1, {NUM_CLASSES}])"
            )));
        }
    };
    if len != NUM_CLASSES {
        return Err(PipelineError::Classifier(format!(
            "expected {NUM_CLASSES} class scores, got {len}"
        )));
    }

    let slice = output
        .as_slice::<f32>()
        .map_err(|e| PipelineError::Classifier(format!("model output is not f32: {e}")))?;
    Ok(slice.to_vec())
}
