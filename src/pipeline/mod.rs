//! The loaded inference pipeline: tokenizer + ONNX session + label table.

mod builder;
mod error;

pub use builder::PipelineBuilder;
pub use error::PipelineError;

use std::collections::HashMap;
use std::sync::Arc;

use ndarray::Array2;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;

use crate::models::{Activation, Mode};

/// One classification result entry. Scores are in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// The reusable classification callable. The web layer and the cache
/// hold pipelines behind this trait so tests can substitute stubs.
pub trait Classify: Send + Sync {
    /// Classifies `text`, returning predictions ordered by descending
    /// score. Only the first entry is consulted by the page.
    fn classify(&self, text: &str) -> Result<Vec<Prediction>, PipelineError>;

    /// Upstream identifier of the loaded model.
    fn model_id(&self) -> &str;

    /// The labels this pipeline can emit, in id order.
    fn labels(&self) -> &[&'static str];
}

/// A text-classification pipeline bound to one registry entry.
///
/// All fields are behind `Arc` or immutable, so the pipeline is
/// `Send + Sync` and can be shared across request tasks.
pub struct Pipeline {
    mode: Mode,
    tokenizer: Arc<Tokenizer>,
    session: Arc<Session>,
    truncation: bool,
}

const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Pipeline>();
    }
};

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub(crate) fn new(
        mode: Mode,
        tokenizer: Tokenizer,
        session: Session,
        truncation: bool,
    ) -> Self {
        Self {
            mode,
            tokenizer: Arc::new(tokenizer),
            session: Arc::new(session),
            truncation,
        }
    }

    /// Encodes `text` into token ids, truncating or rejecting over-long
    /// inputs depending on the truncation flag.
    fn tokenize(&self, text: &str) -> Result<Vec<u32>, PipelineError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| PipelineError::Tokenizer(e.to_string()))?;
        let mut token_ids: Vec<u32> = encoding.get_ids().to_vec();

        let max_length = self.mode.model_spec().max_sequence_length;
        if token_ids.len() > max_length {
            if !self.truncation {
                return Err(PipelineError::Validation(format!(
                    "Input text too long: {} tokens (max: {})",
                    token_ids.len(),
                    max_length
                )));
            }
            log::debug!(
                "Truncating input from {} to {} tokens",
                token_ids.len(),
                max_length
            );
            token_ids.truncate(max_length);
        }

        Ok(token_ids)
    }

    /// Runs the session over the token ids and returns the raw logits,
    /// one per label.
    fn run_model(&self, tokens: &[u32]) -> Result<Vec<f32>, PipelineError> {
        let input_array = Array2::from_shape_vec(
            (1, tokens.len()),
            tokens.iter().map(|&x| x as i64).collect(),
        )
        .map_err(|e| PipelineError::Inference(format!("Failed to create input array: {}", e)))?;
        let input_dyn = input_array.into_dyn();
        let input_ids = input_dyn.as_standard_layout();

        // Single unpadded sequence, so every position is attended.
        let mask_array = Array2::from_shape_vec((1, tokens.len()), vec![1i64; tokens.len()])
            .map_err(|e| PipelineError::Inference(format!("Failed to create mask array: {}", e)))?;
        let mask_dyn = mask_array.into_dyn();
        let attention_mask = mask_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            "input_ids",
            Tensor::from_array(&input_ids).map_err(|e| {
                PipelineError::Inference(format!("Failed to create input tensor: {}", e))
            })?,
        );
        input_tensors.insert(
            "attention_mask",
            Tensor::from_array(&attention_mask).map_err(|e| {
                PipelineError::Inference(format!("Failed to create mask tensor: {}", e))
            })?,
        );

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| PipelineError::Inference(format!("Failed to run model: {}", e)))?;
        let logits = outputs[0].try_extract_tensor::<f32>().map_err(|e| {
            PipelineError::OutputShape(format!("Failed to extract output tensor: {}", e))
        })?;

        if logits.ndim() != 2 {
            return Err(PipelineError::OutputShape(format!(
                "Expected logits of shape [1, num_labels], got {} dimensions",
                logits.ndim()
            )));
        }

        Ok(logits.slice(ndarray::s![0, ..]).iter().cloned().collect())
    }
}

impl Classify for Pipeline {
    fn classify(&self, text: &str) -> Result<Vec<Prediction>, PipelineError> {
        if text.is_empty() {
            return Err(PipelineError::Validation(
                "Input text cannot be empty".into(),
            ));
        }

        let spec = self.mode.model_spec();
        let tokens = self.tokenize(text)?;
        let logits = self.run_model(&tokens)?;

        if logits.len() != spec.labels.len() {
            return Err(PipelineError::OutputShape(format!(
                "Model produced {} logits for {} labels",
                logits.len(),
                spec.labels.len()
            )));
        }

        let scores = match spec.activation {
            Activation::Softmax => softmax(&logits),
            Activation::Sigmoid => logits.iter().map(|&x| sigmoid(x)).collect(),
        };

        let mut predictions: Vec<Prediction> = spec
            .labels
            .iter()
            .zip(scores)
            .map(|(label, score)| Prediction {
                label: (*label).to_string(),
                score,
            })
            .collect();
        predictions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        Ok(predictions)
    }

    fn model_id(&self) -> &str {
        self.mode.model_spec().model_id
    }

    fn labels(&self) -> &[&'static str] {
        self.mode.model_spec().labels
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|x| x / sum).collect()
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let scores = softmax(&[2.0, 0.5, -1.0]);
        let sum: f32 = scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(scores[0] > scores[1] && scores[1] > scores[2]);
    }

    #[test]
    fn test_softmax_is_stable_for_large_logits() {
        let scores = softmax(&[1000.0, 999.0]);
        assert!(scores.iter().all(|s| s.is_finite()));
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn test_sigmoid_bounds() {
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
    }
}
