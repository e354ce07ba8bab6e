//! Academy HTTP Server Binary
//!
//! This is the main entry point for the academy REST API server.
//! It initializes the repository, sets up the HTTP router, starts the
//! settlement scheduler, and serves requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with the local (in-memory) repository (default)
//! cargo run --bin academy-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0, or `[server]` in academy.toml)
//! - `PORT`: Server port (default: 8080, or `[server]` in academy.toml)
//! - `REPOSITORY_TYPE`: Storage backend (default: local)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use academy_backend::db;
use academy_backend::db::RepositoryConfig;
use academy_backend::http::{create_router, AppState};

/// How often the settlement scheduler checks for a month boundary.
const SETTLEMENT_CHECK_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting academy HTTP server");

    let config = RepositoryConfig::load();

    // Initialize global repository once and reuse it across the app
    db::init_repository()?;
    let repository = std::sync::Arc::clone(db::get_repository()?);
    info!("Repository initialized successfully");

    // Create application state and start the settlement scheduler
    let state = AppState::new(repository, config.booking);
    let _settlement_driver = state.settlement.spawn_scheduler(SETTLEMENT_CHECK_INTERVAL);
    info!("Settlement scheduler started");

    // Create router with all endpoints
    let app = create_router(state);

    // Determine bind address: env first, then config file, then defaults
    let host = env::var("HOST").unwrap_or_else(|_| config.server.host.clone());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
