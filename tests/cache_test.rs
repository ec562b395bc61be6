use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sentianalyze::{Classify, Mode, PipelineCache, PipelineError, PipelineLoader, Prediction};

struct StubPipeline {
    mode: Mode,
}

impl Classify for StubPipeline {
    fn classify(&self, _text: &str) -> Result<Vec<Prediction>, PipelineError> {
        Ok(vec![Prediction {
            label: "POSITIVE".into(),
            score: 0.99,
        }])
    }

    fn model_id(&self) -> &str {
        self.mode.model_spec().model_id
    }

    fn labels(&self) -> &[&'static str] {
        self.mode.model_spec().labels
    }
}

#[derive(Default)]
struct CountingLoader {
    loads: AtomicUsize,
}

#[async_trait]
impl PipelineLoader for CountingLoader {
    async fn load(&self, mode: Mode) -> Result<Arc<dyn Classify>, PipelineError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubPipeline { mode }))
    }
}

struct FailingLoader;

#[async_trait]
impl PipelineLoader for FailingLoader {
    async fn load(&self, _mode: Mode) -> Result<Arc<dyn Classify>, PipelineError> {
        Err(PipelineError::Load("no network".into()))
    }
}

#[tokio::test]
async fn test_handle_is_memoized_per_mode() {
    let loader = Arc::new(CountingLoader::default());
    let cache = PipelineCache::new(loader.clone());

    cache.get_or_load(Mode::Basic).await.unwrap();
    cache.get_or_load(Mode::Basic).await.unwrap();
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);

    cache.get_or_load(Mode::Advanced).await.unwrap();
    assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalidate_forces_reload() {
    let loader = Arc::new(CountingLoader::default());
    let cache = PipelineCache::new(loader.clone());

    cache.get_or_load(Mode::Basic).await.unwrap();
    cache.invalidate(Mode::Basic).await;
    assert!(cache.get(Mode::Basic).await.is_none());

    cache.get_or_load(Mode::Basic).await.unwrap();
    assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_clear_drops_every_mode() {
    let loader = Arc::new(CountingLoader::default());
    let cache = PipelineCache::new(loader.clone());

    cache.get_or_load(Mode::Basic).await.unwrap();
    cache.get_or_load(Mode::Advanced).await.unwrap();
    cache.clear().await;

    assert!(cache.get(Mode::Basic).await.is_none());
    assert!(cache.get(Mode::Advanced).await.is_none());

    cache.get_or_load(Mode::Basic).await.unwrap();
    assert_eq!(loader.loads.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_failed_load_leaves_cache_empty() {
    let cache = PipelineCache::new(Arc::new(FailingLoader));

    let result = cache.get_or_load(Mode::Basic).await;
    assert!(matches!(result, Err(PipelineError::Load(_))));
    assert!(cache.get(Mode::Basic).await.is_none());
}
