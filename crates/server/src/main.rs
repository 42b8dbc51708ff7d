//! # cellgrid-server
//!
//! HTTP front end for cellgrid: file import and export, cell access,
//! range formulas, statistical analysis and chart data.

mod config;
mod error;
mod routes;
mod store;

use clap::Parser;
use config::Config;
use routes::{create_router, AppState};
use std::sync::Arc;
use store::MemoryStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    let state = AppState::new(Arc::new(MemoryStore::new()), config.upload_policy());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, max_upload_bytes = config.max_upload_bytes, "cellgrid-server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
