//! imagefetch HTTP server.
//!
//! Serves the authenticated image search endpoint backed by the
//! concurrent aggregation engine.

mod auth;
mod config;
mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use imagefetch_core::{ImageSearchEngineBuilder, TracingEventSink};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::auth::JwtVerifier;
use crate::config::JwtSettings;
use crate::routes::AppState;

#[derive(Parser, Debug)]
#[command(name = "imagefetch-server")]
#[command(about = "Image search API aggregating Unsplash, Pexels and Pixabay")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    let jwt = JwtSettings::from_env()?;
    let engine = ImageSearchEngineBuilder::new()
        .with_env_credentials()
        .with_event_sink(Arc::new(TracingEventSink))
        .build();
    let state = Arc::new(AppState {
        engine,
        verifier: JwtVerifier::new(&jwt),
    });

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", args.host, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("image search API listening on {}", listener.local_addr()?);

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for shutdown signal");
    }
}
