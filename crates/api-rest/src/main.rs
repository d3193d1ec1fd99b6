//! Standalone REST API server binary.
//!
//! Runs the clinic REST API on its own; the workspace's main `clinic-run`
//! binary is the usual entry point, this one is convenient for development
//! when only the HTTP surface is needed.

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{build_router, AppState};
use clinic_core::config::DEFAULT_TOKEN_TTL_HOURS;
use clinic_core::{ClinicConfig, Store};

/// Main entry point for the clinic REST API server.
///
/// # Environment Variables
/// - `CLINIC_REST_ADDR`: Server address (default: "0.0.0.0:5000")
/// - `CLINIC_DATA_DIR`: Directory holding the collection files (default: "./data")
/// - `CLINIC_TOKEN_SECRET`: HMAC secret for bearer tokens (required)
/// - `CLINIC_TOKEN_TTL_HOURS`: Token lifetime in hours (default: 24)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the token secret is missing or the data directory cannot be opened, or
/// - the server address cannot be bound or the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CLINIC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());

    tracing::info!("-- Starting clinic REST API on {}", addr);

    let data_dir =
        PathBuf::from(std::env::var("CLINIC_DATA_DIR").unwrap_or_else(|_| "./data".into()));
    let token_secret = std::env::var("CLINIC_TOKEN_SECRET")
        .map_err(|_| anyhow::anyhow!("CLINIC_TOKEN_SECRET must be set"))?;
    let token_ttl_hours = match std::env::var("CLINIC_TOKEN_TTL_HOURS") {
        Ok(raw) => raw.parse()?,
        Err(_) => DEFAULT_TOKEN_TTL_HOURS,
    };

    let cfg = Arc::new(ClinicConfig::new(data_dir, token_secret, token_ttl_hours)?);
    let store = Arc::new(Store::open(cfg.data_dir())?);

    let app = build_router(AppState { cfg, store });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
