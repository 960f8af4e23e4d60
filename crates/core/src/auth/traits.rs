use async_trait::async_trait;
use url::Url;

use super::{AuthError, SessionId, SessionRecord, Token, VerifiedCharacter};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// One registered SSO application, able to drive the authorization-code grant.
///
/// Implementations hold their client credentials; they must not keep any
/// per-request state since a single instance serves all sessions.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Client id of the SSO application.
    fn client_id(&self) -> &str;

    /// Build the URL the browser is sent to.
    fn authorization_url(&self, state: &str, scopes: &[String]) -> Result<Url>;

    /// Exchange an authorization code for a token set.
    async fn exchange_code(&self, code: &str) -> Result<Token>;

    /// Obtain a new token set from a refresh token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<Token>;

    /// Resolve an access token to the character it was issued for.
    async fn verify(&self, access_token: &str) -> Result<VerifiedCharacter>;
}

/// Session storage abstraction.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Retrieve the record stored for a session, expired or not.
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>>;

    /// Store the record of a session, replacing any previous value.
    async fn save(&self, id: &SessionId, record: &SessionRecord) -> Result<()>;
}
