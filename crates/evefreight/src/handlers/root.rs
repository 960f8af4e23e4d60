//! Root route handler with stage-based redirects.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use evefreight_auth::{AuthError, AuthState, Session};
use evefreight_core::auth::{
    machine::{self, Stage},
    AuthPurpose,
};

/// Handler for GET /
///
/// - No identity: redirects to /login
/// - Identity without registration: starts the registration flow
/// - Registered: greets the character
pub async fn root(
    State(state): State<AuthState>,
    jar: SignedCookieJar,
    mut session: Session,
) -> Result<Response, AuthError> {
    match machine::stage(session.state()) {
        Stage::Anonymous => Ok(Redirect::to("/login").into_response()),
        Stage::NeedsRegistration => {
            tracing::debug!(identity = ?session.state().identity, "Escalating to registration");
            let url = state
                .flow
                .start_flow(AuthPurpose::Registration, &mut session)
                .await?;
            Ok((jar.add(session.cookie()), Redirect::to(url.as_str())).into_response())
        }
        Stage::Registered => {
            let name = session
                .state()
                .profile
                .as_ref()
                .map(|profile| profile.character_name.as_str())
                .unwrap_or_default();
            Ok(format!("Welcome, {name}").into_response())
        }
    }
}
