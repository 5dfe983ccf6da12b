//! HTTP surface of the service: shadow URL gateway, JSON API and health checks.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

pub mod api;
pub mod config;
pub mod gateway;
pub mod handlers;
pub mod health;

pub use config::Config;
pub use handlers::not_found_handler;

use crate::ServiceState;

const API_PREFIX: &str = "/api";
const STATUS_PREFIX: &str = "/_status";

/// Maximum upload size in bytes (500 MB)
pub const MAX_UPLOAD_SIZE_BYTES: usize = 500 * 1024 * 1024;

/// Every route the service answers, ready to serve.
pub fn router(config: Config, state: ServiceState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(config.log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .nest(API_PREFIX, api::router(state.clone()))
        .route("/:shadow_url", get(gateway::handler))
        .fallback(handlers::not_found_handler)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE_BYTES))
        .with_state(state)
        .layer(trace_layer)
}

/// Serve on an already bound listener until `shutdown_rx` fires.
pub async fn serve(
    listener: TcpListener,
    config: Config,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let router = router(config, state);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

/// Bind `config.listen_addr` and serve until `shutdown_rx` fires.
pub async fn run(
    config: Config,
    state: ServiceState,
    shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let listener = TcpListener::bind(listen_addr)
        .await
        .map_err(|source| HttpServerError::Bind {
            addr: listen_addr,
            source,
        })?;
    tracing::info!(addr = ?listen_addr, "server listening");

    serve(listener, config, state, shutdown_rx).await
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
