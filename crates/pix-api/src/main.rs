//! # pix-checkout
//!
//! PIX checkout proxy server.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export BUCKPAY_API_KEY=...
//!
//! # Run the server
//! pix-checkout
//! ```

use pix_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Gateway configured: {}", state.has_gateway());
    info!(
        "Plans: {:?}",
        state.plans.active_plans().map(|p| p.id.as_str()).collect::<Vec<_>>()
    );

    let app = routes::create_router(state);

    info!("pix-checkout {} listening on http://{}", env!("CARGO_PKG_VERSION"), addr);

    if !is_prod {
        info!("Create charge: POST http://{}/api/create-pix", addr);
        info!("Check payment: GET http://{}/api/check-payment?external_id=...", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
