use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use evefreight_auth::{auth_routes, AuthState};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::handlers::{health::health, root::root};

/// Create the application router with all routes and middleware.
///
/// `request_timeout` bounds whole requests and should exceed the upstream
/// timeout so that provider failures surface as auth errors.
pub fn create_app(state: AuthState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .with_state(state)
}
