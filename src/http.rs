//! HTTP server for the Prometheus metrics endpoint.

use axum::{Router, routing::get};
use std::net::SocketAddr;
use tokio::sync::broadcast;

/// Handler for GET /metrics.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

fn router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serve `/metrics` on `0.0.0.0:port` until shutdown is signalled.
pub async fn run_http_server(port: u16, mut shutdown_rx: broadcast::Receiver<()>) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind metrics server");
            return;
        }
    };
    tracing::info!(%addr, "Prometheus HTTP server listening");

    let shutdown = async move {
        let _ = shutdown_rx.recv().await;
    };
    if let Err(e) = axum::serve(listener, router())
        .with_graceful_shutdown(shutdown)
        .await
    {
        tracing::error!(error = %e, "Metrics server error");
    }
}
