use std::time::Duration;

use axum_extra::extract::cookie::Key;
use url::Url;

use crate::error::AuthError;

/// EVE SSO host serving the authorize, token and verify endpoints.
pub const DEFAULT_SSO_BASE_URL: &str = "https://login.eveonline.com";

/// Name of the session cookie.
pub const DEFAULT_COOKIE_NAME: &str = "eve-freight";

/// Path the provider redirects back to.
pub const CALLBACK_PATH: &str = "/auth/callback";

/// Minimum cookie secret length accepted for key derivation.
const MIN_COOKIE_SECRET_LEN: usize = 32;

/// Credentials of one SSO application registration.
#[derive(Clone)]
pub struct SsoAppConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for SsoAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsoAppConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

/// Complete auth configuration, built once at startup.
#[derive(Clone)]
pub struct AuthConfig {
    /// Application used by the login flow (no scopes).
    pub login: SsoAppConfig,
    /// Application used by the registration flow (full scope set).
    pub registration: SsoAppConfig,
    /// Public base URL of this service, used for the callback.
    pub base_url: Url,
    pub sso_base_url: Url,
    pub cookie_name: String,
    pub cookie_secret: String,
    pub cookie_secure: bool,
    pub session_ttl: Duration,
    /// Bound on every call to the provider.
    pub upstream_timeout: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("login", &self.login)
            .field("registration", &self.registration)
            .field("base_url", &self.base_url.as_str())
            .field("sso_base_url", &self.sso_base_url.as_str())
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("session_ttl", &self.session_ttl)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    /// Configuration with default cookie, session and provider settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in SSO URL fails to parse.
    pub fn new(
        login: SsoAppConfig,
        registration: SsoAppConfig,
        base_url: Url,
        cookie_secret: String,
    ) -> Result<Self, AuthError> {
        let sso_base_url =
            Url::parse(DEFAULT_SSO_BASE_URL).map_err(|e| AuthError::Config(e.to_string()))?;

        Ok(Self {
            login,
            registration,
            base_url,
            sso_base_url,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_secret,
            cookie_secure: true,
            session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            upstream_timeout: Duration::from_secs(10),
        })
    }

    /// Callback URL registered with both SSO applications.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be joined with the callback path.
    pub fn redirect_uri(&self) -> Result<Url, AuthError> {
        self.base_url
            .join(CALLBACK_PATH)
            .map_err(|e| AuthError::Config(format!("invalid base url: {e}")))
    }

    /// Signing key for the session cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is shorter than 32 bytes.
    pub fn cookie_key(&self) -> Result<Key, AuthError> {
        if self.cookie_secret.len() < MIN_COOKIE_SECRET_LEN {
            return Err(AuthError::Config(format!(
                "cookie secret must be at least {MIN_COOKIE_SECRET_LEN} bytes"
            )));
        }
        Ok(Key::derive_from(self.cookie_secret.as_bytes()))
    }
}
