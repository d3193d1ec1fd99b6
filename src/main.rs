//! Main entry point for the clinic management backend.
//!
//! Resolves configuration from the environment once, opens the document
//! store, and serves the REST API built by `api-rest`.

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{build_router, AppState};
use clinic_core::config::DEFAULT_TOKEN_TTL_HOURS;
use clinic_core::{ClinicConfig, Store};

/// Main entry point for the clinic backend.
///
/// # Environment Variables
/// - `CLINIC_REST_ADDR`: Server address (default: "0.0.0.0:5000")
/// - `CLINIC_DATA_DIR`: Directory holding the collection files (default: "./data")
/// - `CLINIC_TOKEN_SECRET`: HMAC secret for bearer tokens (required)
/// - `CLINIC_TOKEN_TTL_HOURS`: Token lifetime in hours (default: 24)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CLINIC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());

    tracing::info!("++ Starting clinic REST API on {}", addr);

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

    tracing::info!("++ Data directory: {}", cfg.data_dir().display());

    let app = build_router(AppState { cfg, store });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
