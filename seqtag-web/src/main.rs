//! Servidor web Axum expondo o decodificador beam search via JSON

mod config;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use seqtag_core::demo;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::routes::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    let tagger = demo::tagger(config.beam).context("building demo tagger")?;
    info!(
        beam_size = config.beam.beam_size,
        cache_capacity = config.beam.cache_capacity,
        on_exhausted = ?config.beam.on_exhausted,
        "tagger ready"
    );

    let app = router(Arc::new(AppState { tagger }));

    let listener = tokio::net::TcpListener::bind(config.bind.as_str())
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!("🚀 Servidor seqtag iniciado em http://{}", config.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
