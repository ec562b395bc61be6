//! A self-hosted sentiment and emotion analysis page.
//!
//! One process serves one page: free text goes in, a predicted label
//! and confidence score come out. Two operating modes map to two
//! pre-trained ONNX text-classification models; the advanced mode sits
//! behind a password gate. Pipelines are memoized per mode with
//! explicit invalidation on reload, mode change, and gate transitions.
//!
//! # Basic usage
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sentianalyze::{Classify, Mode, ModelManager, Pipeline};
//!
//! let manager = ModelManager::new_default()?;
//! manager.ensure_downloaded(Mode::Basic.model_spec()).await?;
//!
//! let pipeline = Pipeline::builder()
//!     .with_model_manager(manager)
//!     .with_truncation(true)
//!     .build(Mode::Basic)?;
//!
//! let predictions = pipeline.classify("This is a great movie!")?;
//! println!("{}: {:.2}", predictions[0].label, predictions[0].score);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread safety
//!
//! [`Pipeline`] is `Send + Sync`; the server shares one instance per
//! mode across request tasks through [`cache::PipelineCache`].

pub mod analyze;
pub mod cache;
pub mod gate;
pub mod model_manager;
pub mod models;
pub mod pipeline;
mod runtime;
pub mod session;
pub mod sysmon;
pub mod verdict;
pub mod web;

pub use analyze::{run_analysis, Analysis};
pub use cache::{OnnxLoader, PipelineCache, PipelineLoader};
pub use gate::AccessGate;
pub use model_manager::{ModelError, ModelManager};
pub use models::{Activation, Mode, ModelSpec};
pub use pipeline::{Classify, Pipeline, PipelineBuilder, PipelineError, Prediction};
pub use runtime::RuntimeConfig;
pub use session::{SessionState, SessionStore};

pub fn init_logger() {
    env_logger::init();
}
