use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use evefreight_auth::{AuthConfig, AuthError, SsoAppConfig};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Errors raised while reading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Credentials of one SSO application as written in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppCredentials {
    #[serde(rename = "clientid")]
    pub client_id: String,
    #[serde(rename = "secretkey")]
    pub secret_key: String,
}

/// Service configuration read from a JSON file.
///
/// ```json
/// {
///   "regapp": { "clientid": "...", "secretkey": "..." },
///   "authapp": { "clientid": "...", "secretkey": "..." },
///   "url": "https://freight.example.com",
///   "cookiesecret": "at least 32 bytes of secret"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application used by the registration flow.
    #[serde(rename = "regapp")]
    pub registration: AppCredentials,
    /// Application used by the login flow.
    #[serde(rename = "authapp")]
    pub login: AppCredentials,
    /// Public base URL; the callback is `{url}/auth/callback`.
    pub url: String,
    #[serde(rename = "cookiesecret")]
    pub cookie_secret: String,
    #[serde(rename = "ssobaseurl", default)]
    pub sso_base_url: Option<String>,
    #[serde(rename = "cookiesecure", default)]
    pub cookie_secure: Option<bool>,
    #[serde(rename = "sessionttldays", default)]
    pub session_ttl_days: Option<u64>,
    #[serde(rename = "upstreamtimeoutsecs", default)]
    pub upstream_timeout_secs: Option<u64>,
}

impl Config {
    /// Load the configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Validate and convert into the auth crate's configuration.
    pub fn auth_config(&self) -> Result<AuthConfig, AuthError> {
        let base_url = parse_url("url", &self.url)?;

        let mut config = AuthConfig::new(
            sso_app(&self.login),
            sso_app(&self.registration),
            base_url,
            self.cookie_secret.clone(),
        )?;

        if let Some(sso_base_url) = &self.sso_base_url {
            config.sso_base_url = parse_url("ssobaseurl", sso_base_url)?;
        }
        if let Some(secure) = self.cookie_secure {
            config.cookie_secure = secure;
        }
        if let Some(days) = self.session_ttl_days {
            let secs = days.checked_mul(SECS_PER_DAY).ok_or_else(|| {
                AuthError::Config(format!("sessionttldays {days} is out of range"))
            })?;
            config.session_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = self.upstream_timeout_secs {
            if secs == 0 {
                return Err(AuthError::Config(
                    "upstreamtimeoutsecs must be positive".to_string(),
                ));
            }
            config.upstream_timeout = Duration::from_secs(secs);
        }

        // Surface a short secret at startup rather than on the first request.
        config.cookie_key()?;

        Ok(config)
    }
}

fn sso_app(credentials: &AppCredentials) -> SsoAppConfig {
    SsoAppConfig {
        client_id: credentials.client_id.clone(),
        client_secret: credentials.secret_key.clone(),
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url, AuthError> {
    Url::parse(value).map_err(|e| AuthError::Config(format!("invalid {key} {value:?}: {e}")))
}
