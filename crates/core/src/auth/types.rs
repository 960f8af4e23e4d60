use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cryptographically random session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// EVE character identifier as issued by the SSO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(i64);

impl CharacterId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which SSO application a flow belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthPurpose {
    /// Identity check only, no scopes.
    Login,
    /// Account registration with the full scope set.
    Registration,
}

impl std::fmt::Display for AuthPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login => write!(f, "login"),
            Self::Registration => write!(f, "registration"),
        }
    }
}

/// Character details returned by the provider's verify endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedCharacter {
    pub character_id: CharacterId,
    pub character_name: String,
    /// Scopes granted to the token that was verified.
    pub scopes: Vec<String>,
    pub owner_hash: String,
}

/// Per-browser authentication state.
///
/// `pending_state` is only set between a redirect to the provider and the
/// matching callback. `identity` is only set by a callback that passed state
/// validation and token verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub auth_purpose: Option<AuthPurpose>,
    pub pending_state: Option<String>,
    pub identity: Option<CharacterId>,
    /// Profile recorded by a completed registration flow.
    pub profile: Option<VerifiedCharacter>,
}

/// Session state as kept by a repository.
///
/// `expires_at` is enforced by the server; the cookie max-age only tells the
/// browser when to drop its copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub state: SessionState,
    pub expires_at: DateTime<Utc>,
}

/// OAuth2 token set obtained from a code exchange or refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[redacted]")
            .field("token_type", &self.token_type)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[redacted]"),
            )
            .field("expiry", &self.expiry)
            .finish()
    }
}
