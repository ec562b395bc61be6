//! Explicit memoization of loaded pipelines, keyed by mode.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::model_manager::ModelManager;
use crate::models::Mode;
use crate::pipeline::{Classify, Pipeline, PipelineError};

/// Produces a pipeline for a mode. The web layer uses [`OnnxLoader`];
/// tests substitute stubs to observe load and invalidation behavior.
#[async_trait]
pub trait PipelineLoader: Send + Sync {
    async fn load(&self, mode: Mode) -> Result<Arc<dyn Classify>, PipelineError>;
}

/// Downloads model files on first use, then builds an ONNX pipeline.
pub struct OnnxLoader {
    manager: ModelManager,
    truncation: bool,
}

impl OnnxLoader {
    pub fn new(manager: ModelManager, truncation: bool) -> Self {
        Self { manager, truncation }
    }
}

#[async_trait]
impl PipelineLoader for OnnxLoader {
    async fn load(&self, mode: Mode) -> Result<Arc<dyn Classify>, PipelineError> {
        let spec = mode.model_spec();
        self.manager.ensure_downloaded(spec).await?;

        let start = Instant::now();
        // Session creation is CPU-bound and can take seconds for the
        // large sentiment model; keep it off the async executor.
        let manager = self.manager.clone();
        let truncation = self.truncation;
        let pipeline = tokio::task::spawn_blocking(move || {
            Pipeline::builder()
                .with_model_manager(manager)
                .with_truncation(truncation)
                .build(mode)
        })
        .await
        .map_err(|e| PipelineError::Load(format!("Model load task failed: {}", e)))??;

        log::info!(
            "Loaded pipeline for '{}' in {:.2?}",
            spec.model_id,
            start.elapsed()
        );
        Ok(Arc::new(pipeline))
    }
}

/// Process-wide store mapping a mode to its loaded pipeline handle,
/// with explicit invalidation. Lifecycle (load on first use, cleared on
/// reload, mode change, and gate transitions) is driven by the callers.
pub struct PipelineCache {
    entries: Mutex<HashMap<Mode, Arc<dyn Classify>>>,
    loader: Arc<dyn PipelineLoader>,
}

impl PipelineCache {
    pub fn new(loader: Arc<dyn PipelineLoader>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            loader,
        }
    }

    /// Returns the memoized handle for `mode`, loading it on a miss.
    /// A failed load leaves the cache empty so the next render retries.
    pub async fn get_or_load(&self, mode: Mode) -> Result<Arc<dyn Classify>, PipelineError> {
        let mut entries = self.entries.lock().await;
        if let Some(pipeline) = entries.get(&mode) {
            return Ok(Arc::clone(pipeline));
        }

        let pipeline = self.loader.load(mode).await?;
        entries.insert(mode, Arc::clone(&pipeline));
        Ok(pipeline)
    }

    /// Returns the memoized handle without loading.
    pub async fn get(&self, mode: Mode) -> Option<Arc<dyn Classify>> {
        self.entries.lock().await.get(&mode).cloned()
    }

    /// Drops the handle for one mode.
    pub async fn invalidate(&self, mode: Mode) {
        if self.entries.lock().await.remove(&mode).is_some() {
            log::info!("Invalidated pipeline handle for mode '{}'", mode);
        }
    }

    /// Drops every memoized handle.
    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        if !entries.is_empty() {
            log::info!("Clearing {} memoized pipeline handle(s)", entries.len());
        }
        entries.clear();
    }
}
