// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Waitlist Gateway Service
//!
//! ## Endpoints
//!
//! - `POST /api/waitlist`: submit `{ email, role }`
//! - `GET /api/health`: liveness and credential status
//! - `GET /api/test-notion`: read-only ledger connectivity probe
//! - `GET /metrics`: Prometheus metrics
//!
//! Anything else is served from `STATIC_DIR`.
//!
//! ## Configuration
//!
//! Environment variables, optionally from a `.env` file:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:3000)
//! - `NOTION_TOKEN`, `NOTION_DATABASE_ID`: ledger credentials
//! - `RATE_LIMIT_WINDOW_MS`: window length (default: 900000)
//! - `RATE_LIMIT_MAX_SUBMISSIONS`: submissions per window (default: 3)
//! - `LEDGER_TIMEOUT_MS`: upstream timeout (default: 10000)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use waitlist_gateway::{config::Config, handlers::AppState, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal in production
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        window_ms = config.rate_limit.window_duration_ms,
        max_submissions = config.rate_limit.max_submissions_per_identity,
        ledger_timeout_ms = config.ledger.timeout_ms,
        static_dir = %config.static_dir,
        "Starting waitlist gateway"
    );
    if !config.ledger.is_configured() {
        warn!("NOTION_TOKEN or NOTION_DATABASE_ID is not set; submissions will be rejected");
    }

    let state = Arc::new(AppState::from_config(config.clone())?);

    // Spawn eviction task
    let cleanup_state = state.clone();
    let cleanup_every = config.rate_limit.cleanup_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_every);
        loop {
            interval.tick().await;
            let limiter = cleanup_state.intake.limiter();
            limiter.evict_expired();
            cleanup_state
                .metrics
                .set_tracked_identities(limiter.tracked_identities());
        }
    });

    let app = routes::router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
