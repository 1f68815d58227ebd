//! `contact-relay` server binary.
//!
//! Reads its configuration from the environment (see [`contact_relay::RelayConfig`]),
//! plus `BIND_ADDR` (default `0.0.0.0:8000`) and `RUST_LOG`.

use std::env;
use std::process::ExitCode;

use contact_relay::{server, Relay, RelayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid relay configuration");
            return ExitCode::FAILURE;
        }
    };

    let relay = match Relay::from_config(&config) {
        Ok(relay) => relay,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build relay");
            return ExitCode::FAILURE;
        }
    };

    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %addr, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        addr = %addr,
        version = contact_relay::VERSION,
        owner = %relay.owner(),
        "Contact relay listening"
    );

    if let Err(e) = axum::serve(listener, server::router(relay))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
