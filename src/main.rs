//! # Botx
//!
//! A Rust web service that posts one AI-generated tweet each time its endpoint is called.
//!
//! ## API Endpoints
//!
//! - `GET /api/tweet`: Generates a tweet with Gemini and posts it to Twitter/X
//! - `GET /health`: Returns service health status

use botx::{build_router, get_server_port, AppState, LiveClients};
use log::info;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Main entry point for the botx web service.
///
/// This function initializes the logging system, sets up the HTTP server with all routes,
/// and serves requests until Ctrl-C is received.
///
/// # Logging
///
/// The application uses the `env_logger` crate for structured logging. Log levels
/// can be controlled via the `RUST_LOG` environment variable.
///
/// # Example Usage
///
/// ```bash
/// # Run with default port 3000
/// cargo run
///
/// # Run on custom port with debug logging
/// PORT=8080 RUST_LOG=debug cargo run
/// ```
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    let app = build_router(AppState::from_process(LiveClients))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let port = get_server_port();
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    info!("Starting botx server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
