use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::info;

use sentianalyze::cache::{OnnxLoader, PipelineCache};
use sentianalyze::gate::AccessGate;
use sentianalyze::model_manager::ModelManager;
use sentianalyze::models::Mode;
use sentianalyze::session::SessionStore;
use sentianalyze::web::{router, AppState};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to serve the page on
    #[arg(short, long, default_value_t = 8501)]
    port: u16,

    /// Directory for downloaded model files (defaults to the platform cache)
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Remove any cached model files before starting
    #[arg(short, long)]
    fresh: bool,

    /// Reject over-long inputs instead of truncating them
    #[arg(long)]
    no_truncation: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let manager = match &args.models_dir {
        Some(dir) => ModelManager::new(dir).context("Failed to create models directory")?,
        None => ModelManager::new_default().context("Failed to create models directory")?,
    };

    if args.fresh {
        info!("Fresh start requested - removing any cached model files");
        for mode in Mode::ALL {
            manager
                .remove_download(mode.model_spec())
                .with_context(|| format!("Failed to remove cached files for {}", mode))?;
        }
    }

    let loader = OnnxLoader::new(manager, !args.no_truncation);
    let state = AppState::new(
        SessionStore::new(),
        PipelineCache::new(Arc::new(loader)),
        AccessGate::from_env(),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("SentiAnalyze listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}
