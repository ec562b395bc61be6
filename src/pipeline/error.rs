use ort::Error as OrtError;

use crate::model_manager::ModelError;

/// Failure taxonomy for the classification pipeline. Every variant
/// degrades to an inline message on the page; none is fatal.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The model or tokenizer could not be fetched or loaded.
    #[error("Error loading model: {0}")]
    Load(String),
    /// The tokenizer rejected the input text.
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
    /// The ONNX session failed while running.
    #[error("An error occurred during analysis: {0}")]
    Inference(String),
    /// The model produced output we cannot interpret.
    #[error("Unexpected response format from the model: {0}")]
    OutputShape(String),
    /// The input failed validation before any model call.
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl From<OrtError> for PipelineError {
    fn from(err: OrtError) -> Self {
        PipelineError::Inference(err.to_string())
    }
}

impl From<ModelError> for PipelineError {
    fn from(err: ModelError) -> Self {
        PipelineError::Load(err.to_string())
    }
}
