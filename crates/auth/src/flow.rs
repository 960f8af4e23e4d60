//! SSO flow controller.
//!
//! Drives the two halves of the authorization-code grant that are separated
//! by the browser's round trip to the provider:
//!
//! - [`SsoFlow::start_flow`] issues a state token, records it in the session
//!   and returns the provider URL to redirect to.
//! - [`SsoFlow::complete_flow`] validates the callback against the session,
//!   exchanges the code with the context the session started, and records
//!   the verified character.

use std::sync::Arc;

use evefreight_core::auth::{
    generate_state, machine, AuthError as CoreError, AuthPurpose, SessionState,
    VerifiedCharacter,
};
use serde::Deserialize;
use url::Url;

use crate::context::AuthContexts;
use crate::error::AuthError;
use crate::sessions::Session;
use crate::token_source::AuthenticatedApi;

/// Query parameters of the provider callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Result of a successful callback.
pub struct CompletedFlow {
    pub purpose: AuthPurpose,
    pub character: VerifiedCharacter,
    /// Request-scoped handle for calls made on behalf of the character.
    pub api: AuthenticatedApi,
}

/// Runs SSO flows against the shared auth contexts.
#[derive(Clone)]
pub struct SsoFlow {
    contexts: Arc<AuthContexts>,
}

impl SsoFlow {
    pub fn new(contexts: AuthContexts) -> Self {
        Self {
            contexts: Arc::new(contexts),
        }
    }

    pub fn contexts(&self) -> &AuthContexts {
        &self.contexts
    }

    /// Begin a flow for `purpose`, returning the provider URL.
    ///
    /// # Errors
    ///
    /// Fails with `EntropySourceFailed` or `SessionPersistFailed`; the
    /// session is unchanged in either case.
    pub async fn start_flow(&self, purpose: AuthPurpose, session: &mut Session) -> Result<Url, AuthError> {
        let base = session.state().clone();
        self.start(purpose, base, session).await
    }

    /// Forget the session's identity and begin a login flow.
    pub async fn start_login(&self, session: &mut Session) -> Result<Url, AuthError> {
        let base = machine::forget_identity(session.state());
        self.start(AuthPurpose::Login, base, session).await
    }

    async fn start(
        &self,
        purpose: AuthPurpose,
        base: SessionState,
        session: &mut Session,
    ) -> Result<Url, AuthError> {
        let context = self.contexts.get(purpose);
        let state_token = generate_state()?;
        let url = context.authorization_url(&state_token)?;

        session
            .commit(machine::begin(&base, purpose, state_token))
            .await?;

        tracing::info!(
            purpose = %purpose,
            client_id = context.client_id(),
            "Starting SSO flow"
        );

        Ok(url)
    }

    /// Finish the flow the session started, using the callback parameters.
    ///
    /// # Errors
    ///
    /// `NoPendingFlow` and `StateMismatch` when the callback does not belong
    /// to the session's pending flow; `ExchangeFailed`, `TokenSourceFailed`
    /// or `VerificationFailed` when the provider steps fail; and
    /// `SessionPersistFailed` when the spent token or the outcome cannot be
    /// stored. The code is never exchanged unless the spent token was stored.
    pub async fn complete_flow(
        &self,
        session: &mut Session,
        callback: &CallbackQuery,
    ) -> Result<CompletedFlow, AuthError> {
        let purpose = match machine::validate_callback(session.state(), callback.state.as_deref()) {
            Ok(purpose) => purpose,
            Err(CoreError::StateMismatch) => {
                let rejected = machine::reject(session.state());
                Self::record_rejection(session, rejected).await;
                return Err(CoreError::StateMismatch.into());
            }
            Err(e) => return Err(e.into()),
        };

        // The token is spent before the code reaches the provider, so a
        // failed exchange can never be retried with it.
        let consumed = machine::consume(session.state());
        session.commit(consumed).await?;

        let completed = self.exchange_and_verify(purpose, callback).await?;

        if let Some(previous) = session.state().identity {
            if previous != completed.character.character_id {
                tracing::warn!(
                    purpose = %purpose,
                    previous = %previous,
                    verified = %completed.character.character_id,
                    "Verified character differs from session identity, replacing it"
                );
            }
        }

        session
            .commit(machine::authenticate(
                session.state(),
                purpose,
                &completed.character,
            ))
            .await?;

        tracing::info!(
            purpose = %purpose,
            character_id = %completed.character.character_id,
            "SSO flow completed"
        );

        Ok(completed)
    }

    async fn exchange_and_verify(
        &self,
        purpose: AuthPurpose,
        callback: &CallbackQuery,
    ) -> Result<CompletedFlow, CoreError> {
        let context = self.contexts.get(purpose);

        if let Some(error) = &callback.error {
            let description = callback.error_description.as_deref().unwrap_or("no description");
            return Err(CoreError::ExchangeFailed(format!(
                "provider returned {error}: {description}"
            )));
        }

        let code = callback
            .code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or_else(|| {
                CoreError::ExchangeFailed("callback carried no authorization code".to_string())
            })?;

        let token = context.exchange(code).await?;
        let token_source = context.token_source(token)?;
        let character = context.verify(&token_source).await?;

        Ok(CompletedFlow {
            purpose,
            api: AuthenticatedApi {
                character_id: character.character_id,
                purpose,
                token_source,
            },
            character,
        })
    }

    async fn record_rejection(session: &mut Session, next: SessionState) {
        if let Err(e) = session.commit(next).await {
            tracing::error!(error = %e, "Failed to persist rejected SSO flow");
        }
    }
}
