//! Request-scoped token sources.
//!
//! A [`TokenSource`] is derived from the token obtained by one callback and
//! lives only as long as the request that produced it. It is never stored on
//! the shared [`AuthContext`](crate::AuthContext).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use evefreight_core::auth::{
    is_token_expired, AuthError, AuthPurpose, CharacterId, Result, Token, TokenExchanger,
};
use tokio::sync::Mutex;

/// Produces a current access token, refreshing it when it expires.
pub struct TokenSource {
    exchanger: Arc<dyn TokenExchanger>,
    token: Mutex<Token>,
    timeout: Duration,
}

impl TokenSource {
    /// Wrap `token` so it can be refreshed through `exchanger`.
    ///
    /// # Errors
    ///
    /// Returns `TokenSourceFailed` if the token is not a usable bearer token,
    /// or is already expired without a refresh token.
    pub fn new(exchanger: Arc<dyn TokenExchanger>, token: Token, timeout: Duration) -> Result<Self> {
        if token.access_token.is_empty() {
            return Err(AuthError::TokenSourceFailed(
                "provider returned an empty access token".to_string(),
            ));
        }

        if !token.token_type.eq_ignore_ascii_case("bearer") {
            return Err(AuthError::TokenSourceFailed(format!(
                "unsupported token type {}",
                token.token_type
            )));
        }

        if token.refresh_token.is_none() && is_token_expired(&token, Utc::now()) {
            return Err(AuthError::TokenSourceFailed(
                "token already expired and cannot be refreshed".to_string(),
            ));
        }

        Ok(Self {
            exchanger,
            token: Mutex::new(token),
            timeout,
        })
    }

    /// Current access token, refreshed first if it has expired.
    ///
    /// # Errors
    ///
    /// Returns `TokenSourceFailed` if a needed refresh fails or times out.
    pub async fn access_token(&self) -> Result<String> {
        let mut token = self.token.lock().await;

        if is_token_expired(&token, Utc::now()) {
            let refresh_token = token.refresh_token.clone().ok_or_else(|| {
                AuthError::TokenSourceFailed("token expired without refresh token".to_string())
            })?;

            let mut fresh =
                tokio::time::timeout(self.timeout, self.exchanger.refresh_token(&refresh_token))
                    .await
                    .map_err(|_| AuthError::TokenSourceFailed("token refresh timed out".to_string()))??;

            // The SSO may omit the refresh token when it is unchanged.
            if fresh.refresh_token.is_none() {
                fresh.refresh_token = Some(refresh_token);
            }

            tracing::debug!(client_id = self.exchanger.client_id(), "Refreshed access token");
            *token = fresh;
        }

        Ok(token.access_token.clone())
    }

    /// Snapshot of the token currently held.
    pub async fn token(&self) -> Token {
        self.token.lock().await.clone()
    }
}

/// Authenticated API handle for the character verified by one callback.
pub struct AuthenticatedApi {
    pub character_id: CharacterId,
    pub purpose: AuthPurpose,
    pub token_source: TokenSource,
}
