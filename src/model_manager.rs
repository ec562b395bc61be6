use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::models::ModelSpec;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Download of {url} failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
}

/// Fetches and caches model/tokenizer files for the registry entries.
///
/// Files live under one directory per model. Concurrent downloads are
/// serialized behind a single lock so two sessions racing to load the
/// same model do not clobber each other's files.
#[derive(Clone)]
pub struct ModelManager {
    models_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    /// Creates a new ModelManager with the default models directory.
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::default_models_dir())
    }

    /// Returns the default models directory path.
    pub fn default_models_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("SENTIANALYZE_CACHE") {
            return PathBuf::from(path).join("models");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("sentianalyze").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("sentianalyze").join("models");
        }

        // 4. If all else fails, use the system temp directory
        env::temp_dir().join("sentianalyze").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn model_path(&self, spec: &ModelSpec) -> PathBuf {
        self.models_dir.join(spec.name).join("model.onnx")
    }

    pub fn tokenizer_path(&self, spec: &ModelSpec) -> PathBuf {
        self.models_dir.join(spec.name).join("tokenizer.json")
    }

    pub fn is_downloaded(&self, spec: &ModelSpec) -> bool {
        self.model_path(spec).exists() && self.tokenizer_path(spec).exists()
    }

    /// Downloads model and tokenizer files for `spec`, verifying pinned
    /// digests. Partial downloads are removed on failure.
    pub async fn download(&self, spec: &ModelSpec) -> Result<(), ModelError> {
        let _lock = self.download_lock.lock().await;

        let model_dir = self.models_dir.join(spec.name);
        log::info!("Creating model directory at {:?}", model_dir);
        fs::create_dir_all(&model_dir)?;

        let model_result = self
            .fetch_file(spec.model_url, &self.model_path(spec), spec.model_sha256, "model")
            .await;
        let tokenizer_result = self
            .fetch_file(
                spec.tokenizer_url,
                &self.tokenizer_path(spec),
                spec.tokenizer_sha256,
                "tokenizer",
            )
            .await;

        match (model_result, tokenizer_result) {
            (Ok(()), Ok(())) => {
                log::info!("Model '{}' ready to use", spec.model_id);
                Ok(())
            }
            (Err(e), _) | (_, Err(e)) => {
                log::error!("Failed to set up model '{}': {}", spec.model_id, e);
                let _ = self.remove_download(spec);
                Err(e)
            }
        }
    }

    async fn fetch_file(
        &self,
        url: &str,
        path: &Path,
        expected_sha256: Option<&str>,
        file_type: &str,
    ) -> Result<(), ModelError> {
        if path.exists() {
            log::info!("{} file already present at {:?}", file_type, path);
            return Ok(());
        }

        log::info!("Downloading {} file from {} to {:?}", file_type, url, path);
        let response = reqwest::get(url).await?;
        if !response.status().is_success() {
            return Err(ModelError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = format!("{:x}", hasher.finalize());

        match expected_sha256 {
            Some(expected) if digest != expected => {
                log::error!("{} hash mismatch: expected {}, got {}", file_type, expected, digest);
                return Err(ModelError::HashMismatch {
                    file_type: file_type.to_string(),
                    expected: expected.to_string(),
                    actual: digest,
                });
            }
            Some(_) => log::info!("{} digest verified: {}", file_type, digest),
            // Upstream publishes no digest for this file; record what we got.
            None => log::info!("{} downloaded, sha256={}", file_type, digest),
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn remove_download(&self, spec: &ModelSpec) -> Result<(), ModelError> {
        let model_path = self.model_path(spec);
        let tokenizer_path = self.tokenizer_path(spec);

        if model_path.exists() {
            fs::remove_file(&model_path)?;
        }
        if tokenizer_path.exists() {
            fs::remove_file(&tokenizer_path)?;
        }
        Ok(())
    }

    /// Downloads the files for `spec` unless they are already present.
    pub async fn ensure_downloaded(&self, spec: &ModelSpec) -> Result<(), ModelError> {
        if self.is_downloaded(spec) {
            log::info!("Model '{}' already downloaded", spec.model_id);
            return Ok(());
        }
        self.download(spec).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mode;

    #[test]
    fn test_default_models_dir_env_override() {
        env::set_var("SENTIANALYZE_CACHE", "/tmp/sentianalyze-test-cache");
        let path = ModelManager::default_models_dir();
        assert!(path
            .to_str()
            .unwrap()
            .contains("/tmp/sentianalyze-test-cache/models"));
        env::remove_var("SENTIANALYZE_CACHE");

        let path = ModelManager::default_models_dir();
        assert!(path.to_str().unwrap().contains("sentianalyze"));
    }

    #[test]
    fn test_paths_are_per_model() {
        let manager = ModelManager::new("/tmp/sentianalyze-test-paths").unwrap();
        let basic = manager.model_path(Mode::Basic.model_spec());
        let advanced = manager.model_path(Mode::Advanced.model_spec());
        assert_ne!(basic, advanced);
        assert!(basic.ends_with("sentiment-roberta-large-english/model.onnx"));
    }

    #[test]
    fn test_missing_files_not_reported_downloaded() {
        let manager = ModelManager::new("/tmp/sentianalyze-test-empty").unwrap();
        assert!(!manager.is_downloaded(Mode::Basic.model_spec()));
    }
}
