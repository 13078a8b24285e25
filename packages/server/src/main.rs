use std::sync::Arc;

use anyhow::Context;
use forge_common::storage::open_store;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};

use forge_server::config::AppConfig;
use forge_server::database::init_db;
use forge_server::pipeline::{ArtifactPipeline, GitCliFetcher};
use forge_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;

    let level: Level = config
        .server
        .log_level
        .parse()
        .with_context(|| format!("Invalid server.log_level `{}`", config.server.log_level))?;
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .init();

    let db = init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    info!("Database ready");

    let store = open_store(&config.storage)
        .await
        .context("Failed to open artifact store")?;
    info!(backend = ?config.storage.backend, "Artifact store ready");

    let fetcher = Arc::new(GitCliFetcher::new(config.pipeline.git_bin.clone()));
    let pipeline = Arc::new(ArtifactPipeline::new(
        config.pipeline.clone(),
        fetcher,
        store,
    ));

    let shutdown = CancellationToken::new();
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        config,
        db,
        pipeline,
        shutdown: shutdown.clone(),
    };
    let app = forge_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, cancelling in-flight builds");
    shutdown.cancel();
}
