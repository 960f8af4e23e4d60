//! Application state for auth.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use evefreight_core::accounts::{AccountRepository, EsiKeyRepository};
use evefreight_core::auth::{SessionRepository, TokenExchanger};

use crate::config::AuthConfig;
use crate::context::{AuthContext, AuthContexts};
use crate::error::AuthError;
use crate::flow::SsoFlow;
use crate::sessions::SessionStore;

#[cfg(not(feature = "mock"))]
use crate::config::SsoAppConfig;
#[cfg(not(feature = "mock"))]
use crate::providers::EveSsoProvider;

#[cfg(feature = "mock")]
use crate::providers::MockProvider;

/// Shared state for auth handlers.
#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<AuthConfig>,
    pub flow: SsoFlow,
    pub sessions: SessionStore,
    pub accounts: Arc<dyn AccountRepository>,
    pub keys: Arc<dyn EsiKeyRepository>,
    cookie_key: Key,
}

impl AuthState {
    /// Assemble the state from already-built collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie secret is too short or the session TTL
    /// is out of range.
    pub fn new(
        config: AuthConfig,
        contexts: AuthContexts,
        sessions: Arc<dyn SessionRepository>,
        accounts: Arc<dyn AccountRepository>,
        keys: Arc<dyn EsiKeyRepository>,
    ) -> Result<Self, AuthError> {
        let cookie_key = config.cookie_key()?;
        let sessions = SessionStore::new(sessions, &config)?;

        Ok(Self {
            config: Arc::new(config),
            flow: SsoFlow::new(contexts),
            sessions,
            accounts,
            keys,
            cookie_key,
        })
    }

    /// Build the login and registration contexts against EVE SSO.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider client cannot be constructed or the
    /// cookie secret is too short.
    #[cfg(not(feature = "mock"))]
    pub fn from_config(
        config: AuthConfig,
        sessions: Arc<dyn SessionRepository>,
        accounts: Arc<dyn AccountRepository>,
        keys: Arc<dyn EsiKeyRepository>,
    ) -> Result<Self, AuthError> {
        let redirect_uri = config.redirect_uri()?;
        let provider = |app: &SsoAppConfig| -> Result<Arc<dyn TokenExchanger>, AuthError> {
            Ok(Arc::new(EveSsoProvider::new(
                app,
                &config.sso_base_url,
                redirect_uri.clone(),
                config.upstream_timeout,
            )?))
        };

        let contexts = AuthContexts::new(
            AuthContext::login(provider(&config.login)?, config.upstream_timeout),
            AuthContext::registration(provider(&config.registration)?, config.upstream_timeout),
        )?;

        Self::new(config, contexts, sessions, accounts, keys)
    }

    /// Build both contexts on mock providers that approve every flow
    /// straight back to this service's callback.
    #[cfg(feature = "mock")]
    pub fn from_config(
        config: AuthConfig,
        sessions: Arc<dyn SessionRepository>,
        accounts: Arc<dyn AccountRepository>,
        keys: Arc<dyn EsiKeyRepository>,
    ) -> Result<Self, AuthError> {
        use evefreight_core::auth::CharacterId;

        const MOCK_CHARACTER: i64 = 90_000_001;

        let redirect_uri = config.redirect_uri()?;
        let provider = |client_id: &str| -> Arc<dyn TokenExchanger> {
            Arc::new(
                MockProvider::new(client_id, redirect_uri.clone())
                    .with_auto_approve(CharacterId::new(MOCK_CHARACTER)),
            )
        };

        tracing::warn!("Using mock SSO providers, every flow is approved");

        let contexts = AuthContexts::new(
            AuthContext::login(provider(&config.login.client_id), config.upstream_timeout),
            AuthContext::registration(
                provider(&config.registration.client_id),
                config.upstream_timeout,
            ),
        )?;

        Self::new(config, contexts, sessions, accounts, keys)
    }
}

impl AuthState {
    /// Key signing the session cookie.
    pub fn cookie_key(&self) -> Key {
        self.cookie_key.clone()
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key()
    }
}
