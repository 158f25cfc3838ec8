use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use crate::api::{app, AppState};
use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};

pub async fn handle(port: Option<u16>, memory_store: bool) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(port) = port {
        config.api.port = port;
    }
    tracing::info!("Starting Khedma API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = if memory_store {
        let store = MemoryStore::new();
        store.seed_demo_catalog().await;
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        Arc::new(store)
    } else {
        let pool = DatabaseManager::connect(&config.database).await?;
        Arc::new(PgStore::new(pool))
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));
    let state = AppState::new(config, store)?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Khedma API listening on http://{}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
