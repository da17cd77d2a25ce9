//! Dataset Anchor HTTP service

mod api;
mod config;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dataset_anchor_core::IngestPipeline;
use dataset_anchor_minter::LedgerConfig;

use crate::config::ServiceConfig;
use crate::state::AppState;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Dataset validation and minting service")]
struct Args {
    /// Settings file path
    #[clap(short, long, env = "ANCHOR_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[clap(short, long)]
    listen: Option<SocketAddr>,

    /// JSON file with ingestion limits
    #[clap(long)]
    core_config: Option<PathBuf>,

    /// Mint against the in-process ledger
    #[clap(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut settings = ServiceConfig::load(args.config.as_deref()).context("loading service settings")?;
    if let Some(listen) = args.listen {
        settings.listen_addr = listen;
    }
    if let Some(core_config) = args.core_config {
        settings.core_config = Some(core_config);
    }

    let core = settings.core().context("loading ingestion limits")?;

    // Initialize logging, RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(core.log_filter())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    let mut ledger = LedgerConfig::from_env().context("loading ledger configuration")?;
    if args.dry_run {
        ledger.dry_run = true;
    }

    tracing::info!("Starting dataset anchor service on the {} network", ledger.network);

    let state = Arc::new(AppState::new(IngestPipeline::new(core.limits), &ledger));
    let app = api::create_router(state, settings.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(settings.listen_addr)
        .await
        .with_context(|| format!("binding {}", settings.listen_addr))?;
    tracing::info!("Listening on {}", settings.listen_addr);

    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
