//! The analyze action: validate, invoke the pipeline, shape the result.

use crate::pipeline::{Classify, PipelineError};
use crate::verdict::verdict;

/// What the main panel renders after an Analyze click.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    /// No pipeline handle; analysis is blocked until a model loads.
    ModelUnavailable(String),
    /// Input was empty after trimming; the pipeline was never invoked.
    EmptyInput,
    /// Top prediction plus the templated verdict phrase.
    Classified {
        label: String,
        score: f32,
        verdict: String,
    },
    /// The classification call failed; the message is shown inline.
    Failed(String),
    /// The result sequence was missing the expected first entry.
    MalformedOutput,
}

/// Runs one analysis request against a loaded pipeline.
///
/// Empty or whitespace-only input short-circuits before any model
/// call. Otherwise the pipeline receives the raw, untrimmed text and
/// only the first result entry is consulted.
pub fn run_analysis(pipeline: &dyn Classify, text: &str) -> Analysis {
    if text.trim().is_empty() {
        return Analysis::EmptyInput;
    }

    match pipeline.classify(text) {
        Ok(predictions) => match predictions.first() {
            Some(top) => Analysis::Classified {
                label: top.label.clone(),
                score: top.score,
                verdict: verdict(&top.label, top.score),
            },
            None => Analysis::MalformedOutput,
        },
        Err(PipelineError::OutputShape(_)) => Analysis::MalformedOutput,
        Err(e) => Analysis::Failed(e.to_string()),
    }
}
