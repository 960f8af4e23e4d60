//! Health check endpoint.

use axum::http::StatusCode;

/// GET /health - Liveness probe.
///
/// Returns 200 immediately, without touching the SSO provider.
#[axum::debug_handler]
pub async fn health() -> StatusCode {
    StatusCode::OK
}
