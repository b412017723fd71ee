//! # notes-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the notes API.
//! Binds to configurable port (default 5001).

use std::sync::Arc;

use notes_api::config::{self, AppConfig};
use notes_api::db::{self, PgStore};
use notes_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(config::json_logs_requested(|key| std::env::var(key).ok()));
    let config = AppConfig::from_env()?;
    tracing::info!(?config, "configuration loaded");

    // Database pool is optional; absent means in-memory only.
    let pool = db::init_pool(config.database_url.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Database initialization failed: {e}");
            e
        })?;

    let port = config.port;
    let state = match pool {
        Some(pool) => {
            let store = Arc::new(PgStore::new(pool));
            AppState::new(config, store.clone(), store)?
        }
        None => AppState::in_memory(config)?,
    };

    let app = notes_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Notes API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Notes API stopped");
    Ok(())
}

/// Structured tracing. `RUST_LOG` overrides the default `info` filter.
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
