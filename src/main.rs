//! Waitroom Server — slot broker for meeting rooms
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use waitroom_api::state::AppState;
use waitroom_broker::AllocationEngine;
use waitroom_core::config::AppConfig;
use waitroom_core::error::AppError;
use waitroom_core::traits::snapshot_store::SnapshotStore;
use waitroom_store::JsonSnapshotStore;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("WAITROOM_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting waitroom v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Restore the room table ───────────────────────────
    let store = Arc::new(JsonSnapshotStore::new(&config.persistence.state_file));
    let snapshot = store.load().await?;
    match &snapshot {
        Some(snapshot) => tracing::info!(
            path = %config.persistence.state_file,
            rooms = snapshot.len(),
            "Restored room snapshot"
        ),
        None => tracing::info!("No prior snapshot, starting empty"),
    }

    // ── Step 2: Build the allocation engine ──────────────────────
    let engine = AllocationEngine::new(snapshot, store, &config.broker);

    // ── Step 3: Build and start the HTTP server ──────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app_state = AppState {
        config: Arc::new(config),
        engine,
    };
    let app = waitroom_api::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Waitroom server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Waitroom server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
