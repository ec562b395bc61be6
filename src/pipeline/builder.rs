use ort::session::Session;
use tokenizers::Tokenizer;

use super::{Pipeline, PipelineError};
use crate::model_manager::ModelManager;
use crate::models::Mode;
use crate::runtime::{create_session_builder, RuntimeConfig};

/// Builds a [`Pipeline`] from downloaded model files.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use sentianalyze::{Mode, Pipeline};
///
/// let pipeline = Pipeline::builder()
///     .with_truncation(true)
///     .build(Mode::Basic)?;
/// # Ok(())
/// # }
/// ```
pub struct PipelineBuilder {
    manager: Option<ModelManager>,
    runtime_config: RuntimeConfig,
    truncation: bool,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            manager: None,
            runtime_config: RuntimeConfig::default(),
            truncation: true,
        }
    }

    /// Uses a specific model cache instead of the default location.
    pub fn with_model_manager(mut self, manager: ModelManager) -> Self {
        self.manager = Some(manager);
        self
    }

    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Controls whether over-long inputs are truncated to the model's
    /// maximum sequence length (the default) or rejected.
    pub fn with_truncation(mut self, truncation: bool) -> Self {
        self.truncation = truncation;
        self
    }

    /// Loads the tokenizer and ONNX session for `mode`'s model. The
    /// files must already be downloaded; see [`ModelManager`].
    pub fn build(self, mode: Mode) -> Result<Pipeline, PipelineError> {
        let spec = mode.model_spec();
        let manager = match self.manager {
            Some(manager) => manager,
            None => ModelManager::new_default()
                .map_err(|e| PipelineError::Load(format!("Failed to create model manager: {}", e)))?,
        };

        if !manager.is_downloaded(spec) {
            return Err(PipelineError::Load(format!(
                "Model '{}' is not downloaded. Fetch it first with ModelManager::ensure_downloaded()",
                spec.model_id
            )));
        }

        let tokenizer_path = manager.tokenizer_path(spec);
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            log::error!("Failed to load tokenizer: {}", e);
            PipelineError::Load(format!("Failed to load tokenizer: {}", e))
        })?;
        log::info!("Tokenizer loaded for '{}'", spec.model_id);

        let session = create_session_builder(&self.runtime_config)
            .map_err(|e| PipelineError::Load(format!("Failed to create session builder: {}", e)))?
            .commit_from_file(manager.model_path(spec))
            .map_err(|e| PipelineError::Load(format!("Failed to load ONNX model: {}", e)))?;

        Self::validate_model(&session)?;
        log::info!("Model structure validated for '{}'", spec.model_id);

        Ok(Pipeline::new(mode, tokenizer, session, self.truncation))
    }

    /// A sequence-classification model needs input_ids + attention_mask
    /// in and at least one logits tensor out.
    fn validate_model(session: &Session) -> Result<(), PipelineError> {
        if session.inputs.len() < 2 {
            return Err(PipelineError::Load(format!(
                "Model must have at least 2 inputs (input_ids and attention_mask), found {}",
                session.inputs.len()
            )));
        }
        if session.outputs.is_empty() {
            return Err(PipelineError::Load(
                "Model must have at least 1 output for logits".to_string(),
            ));
        }
        Ok(())
    }
}
