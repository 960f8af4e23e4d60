use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Auth errors for the evefreight_auth crate.
///
/// This wraps the core `AuthError` and adds crate-specific error variants
/// that only exist in the shell.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (flow, token or storage failures)
    #[error(transparent)]
    Core(#[from] evefreight_core::auth::AuthError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// HTTP status reported to the browser.
    pub fn status_code(&self) -> StatusCode {
        use evefreight_core::auth::AuthError as CoreError;

        match self {
            AuthError::Core(core_err) => match core_err {
                CoreError::NoPendingFlow | CoreError::StateMismatch => StatusCode::BAD_REQUEST,
                CoreError::ExchangeFailed(_) | CoreError::TokenSourceFailed(_) => {
                    StatusCode::BAD_GATEWAY
                }
                CoreError::VerificationFailed(_) => StatusCode::UNAUTHORIZED,
                CoreError::SessionPersistFailed(_)
                | CoreError::EntropySourceFailed(_)
                | CoreError::Storage(_)
                | CoreError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AuthError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if matches!(&self, AuthError::Core(e) if e.is_flow_error()) {
            tracing::warn!(error = %self, status = %status, "Authentication rejected");
            "Authentication failed"
        } else {
            tracing::error!(error = %self, "Auth infrastructure error");
            "Internal server error"
        };

        (status, message).into_response()
    }
}
