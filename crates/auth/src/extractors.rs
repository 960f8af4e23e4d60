//! Axum extractors for sessions.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::SignedCookieJar;

use crate::error::AuthError;
use crate::sessions::Session;
use crate::AuthState;

/// Extracts the caller's session, starting a fresh one when the request
/// carries no valid session cookie.
///
/// The session stays locked until the handler drops it.
impl<S> FromRequestParts<S> for Session
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let jar = SignedCookieJar::from_headers(&parts.headers, auth_state.cookie_key());

        Ok(auth_state.sessions.load(&jar).await?)
    }
}
