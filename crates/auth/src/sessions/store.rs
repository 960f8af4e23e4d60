//! Signed-cookie session store.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::SignedCookieJar;
use chrono::Utc;
use evefreight_core::auth::{
    generate_session_id, is_session_expired, AuthError, Result, SessionId, SessionRecord,
    SessionRepository, SessionState,
};
use tokio::sync::OwnedMutexGuard;

use super::SessionLocks;
use crate::config::AuthConfig;

#[derive(Debug)]
struct CookieSettings {
    name: String,
    secure: bool,
    max_age: time::Duration,
    ttl: chrono::Duration,
}

/// Loads and persists [`SessionState`] bound to a signed session cookie.
#[derive(Clone)]
pub struct SessionStore {
    repository: Arc<dyn SessionRepository>,
    locks: SessionLocks,
    cookie: Arc<CookieSettings>,
}

impl SessionStore {
    /// # Errors
    ///
    /// Returns a configuration error if the session TTL cannot be represented
    /// as a cookie max-age or a session expiry.
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        config: &AuthConfig,
    ) -> std::result::Result<Self, crate::error::AuthError> {
        let out_of_range =
            || crate::error::AuthError::Config("session ttl is out of range".to_string());

        let ttl = chrono::Duration::from_std(config.session_ttl)
            .ok()
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(out_of_range)?;
        let max_age = time::Duration::try_from(config.session_ttl).map_err(|_| out_of_range())?;

        Ok(Self {
            repository,
            locks: SessionLocks::new(),
            cookie: Arc::new(CookieSettings {
                name: config.cookie_name.clone(),
                secure: config.cookie_secure,
                max_age,
                ttl,
            }),
        })
    }

    /// Load the session named by the jar's cookie.
    ///
    /// A missing, tampered, unknown or expired cookie yields a fresh empty
    /// session under a new id, as does a failing repository read. The
    /// returned session holds the session's lock until dropped.
    ///
    /// # Errors
    ///
    /// Returns `EntropySourceFailed` if a new session id cannot be generated.
    pub async fn load(&self, jar: &SignedCookieJar) -> Result<Session> {
        if let Some(cookie) = jar.get(&self.cookie.name) {
            let id = SessionId::new(cookie.value().to_string());
            let guard = self.locks.acquire(&id).await;

            match self.repository.load(&id).await {
                Ok(Some(record)) if !is_session_expired(&record, Utc::now()) => {
                    return Ok(self.session(id, record.state, guard));
                }
                Ok(Some(_)) => tracing::debug!("Session expired, starting a fresh session"),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Session lookup failed, starting a fresh session");
                }
            }
        }

        let id = generate_session_id()?;
        let guard = self.locks.acquire(&id).await;
        Ok(self.session(id, SessionState::default(), guard))
    }

    fn session(&self, id: SessionId, state: SessionState, guard: OwnedMutexGuard<()>) -> Session {
        Session {
            id,
            state,
            repository: self.repository.clone(),
            cookie: self.cookie.clone(),
            _guard: guard,
        }
    }
}

/// One browser's session for the duration of a request.
///
/// Overlapping requests of the same browser wait for each other while a
/// `Session` is alive.
pub struct Session {
    id: SessionId,
    state: SessionState,
    repository: Arc<dyn SessionRepository>,
    cookie: Arc<CookieSettings>,
    _guard: OwnedMutexGuard<()>,
}

impl Session {
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Persist `next` and make it the current state.
    ///
    /// Every commit pushes the server-side expiry one TTL into the future.
    /// On failure the current state is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `SessionPersistFailed` if the repository rejects the write.
    pub async fn commit(&mut self, next: SessionState) -> Result<()> {
        let expires_at = Utc::now()
            .checked_add_signed(self.cookie.ttl)
            .ok_or_else(|| AuthError::SessionPersistFailed("session expiry out of range".into()))?;
        let record = SessionRecord {
            state: next,
            expires_at,
        };

        self.repository
            .save(&self.id, &record)
            .await
            .map_err(|e| AuthError::SessionPersistFailed(e.to_string()))?;
        self.state = record.state;
        Ok(())
    }

    /// Cookie binding the browser to this session; signed when added to a
    /// [`SignedCookieJar`].
    pub fn cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie.name.clone(), self.id.to_string()))
            .path("/")
            .http_only(true)
            .secure(self.cookie.secure)
            .same_site(SameSite::Lax)
            .max_age(self.cookie.max_age)
            .build()
    }
}
