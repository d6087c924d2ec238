//! HTTP router and listener.

use axum::{routing::get, Router};
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

use crate::handlers::{metrics_handler, root_handler};
use crate::state::SharedState;

/// Routes `/` and `/metrics`; everything else falls through to the default 404.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Serves `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("simple-metrics-exporter listening on http://{}", addr);
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
