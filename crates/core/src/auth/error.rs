use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no authentication flow is pending for this session")]
    NoPendingFlow,

    #[error("callback state does not match the pending state")]
    StateMismatch,

    #[error("failed to exchange authorization code: {0}")]
    ExchangeFailed(String),

    #[error("failed to derive token source: {0}")]
    TokenSourceFailed(String),

    #[error("failed to verify token: {0}")]
    VerificationFailed(String),

    #[error("failed to persist session: {0}")]
    SessionPersistFailed(String),

    #[error("entropy source failed: {0}")]
    EntropySourceFailed(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// Whether the error stems from the authentication flow itself rather than
    /// from the infrastructure serving it.
    pub fn is_flow_error(&self) -> bool {
        matches!(
            self,
            Self::NoPendingFlow
                | Self::StateMismatch
                | Self::ExchangeFailed(_)
                | Self::TokenSourceFailed(_)
                | Self::VerificationFailed(_)
        )
    }
}
