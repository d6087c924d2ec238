//! Root endpoint handler.

use axum::response::IntoResponse;
use tracing::{debug, instrument};

/// Body served on `/`.
pub const ROOT_TEXT: &str = "Dynatrace test app - /metrics";

/// Handler for the root `/` endpoint.
#[instrument]
pub async fn root_handler() -> impl IntoResponse {
    debug!("Processing / request");
    ROOT_TEXT
}
