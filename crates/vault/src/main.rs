//! `field-vault`: service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured logging (and OTLP export when configured).
//! 3. Build the AES-256-CBC cipher; a key or IV of the wrong length aborts startup.
//! 4. Open the configured storage backend.
//! 5. Build the Axum router and serve until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use vault::config::Config;
use vault::crypto::AesCbcCipher;
use vault::server::{self, state::AppState};
use vault::service::RecordService;
use vault::{storage, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        storage_backend = ?cfg.storage_backend,
        "field-vault starting"
    );

    // -----------------------------------------------------------------------
    // 3. Cipher
    // -----------------------------------------------------------------------
    let cipher = AesCbcCipher::from_text(&cfg.encryption_key, &cfg.initialization_vector)
        .context("invalid encryption configuration")?;

    // -----------------------------------------------------------------------
    // 4. Storage
    // -----------------------------------------------------------------------
    let repository = storage::open(&cfg)?;

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(RecordService::new(repository, Arc::new(cipher)));
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("field-vault stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
