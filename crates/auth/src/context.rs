//! Auth contexts: one per SSO application.

use std::sync::Arc;
use std::time::Duration;

use evefreight_core::auth::{
    registration_scopes, AuthError, AuthPurpose, Result, Token, TokenExchanger, VerifiedCharacter,
};
use url::Url;

use crate::token_source::TokenSource;

/// Credentials, scope set and exchange capability of one SSO application.
///
/// Immutable after construction and shared by every request.
#[derive(Clone)]
pub struct AuthContext {
    purpose: AuthPurpose,
    scopes: Arc<[String]>,
    exchanger: Arc<dyn TokenExchanger>,
    upstream_timeout: Duration,
}

impl AuthContext {
    pub fn new(
        purpose: AuthPurpose,
        scopes: Vec<String>,
        exchanger: Arc<dyn TokenExchanger>,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            purpose,
            scopes: scopes.into(),
            exchanger,
            upstream_timeout,
        }
    }

    /// Login context: identity only, no scopes.
    pub fn login(exchanger: Arc<dyn TokenExchanger>, upstream_timeout: Duration) -> Self {
        Self::new(AuthPurpose::Login, Vec::new(), exchanger, upstream_timeout)
    }

    /// Registration context with the full scope set.
    pub fn registration(exchanger: Arc<dyn TokenExchanger>, upstream_timeout: Duration) -> Self {
        Self::new(
            AuthPurpose::Registration,
            registration_scopes(),
            exchanger,
            upstream_timeout,
        )
    }

    pub fn purpose(&self) -> AuthPurpose {
        self.purpose
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn client_id(&self) -> &str {
        self.exchanger.client_id()
    }

    /// Provider URL for a flow protected by `state`.
    pub fn authorization_url(&self, state: &str) -> Result<Url> {
        self.exchanger.authorization_url(state, &self.scopes)
    }

    /// Exchange an authorization code, bounded by the upstream timeout.
    pub async fn exchange(&self, code: &str) -> Result<Token> {
        tokio::time::timeout(self.upstream_timeout, self.exchanger.exchange_code(code))
            .await
            .map_err(|_| AuthError::ExchangeFailed("token exchange timed out".to_string()))?
    }

    /// Derive a request-scoped, refreshing token source from `token`.
    pub fn token_source(&self, token: Token) -> Result<TokenSource> {
        TokenSource::new(self.exchanger.clone(), token, self.upstream_timeout)
    }

    /// Resolve the character behind a token source, bounded by the upstream timeout.
    pub async fn verify(&self, source: &TokenSource) -> Result<VerifiedCharacter> {
        let access_token = source
            .access_token()
            .await
            .map_err(|e| AuthError::VerificationFailed(e.to_string()))?;

        tokio::time::timeout(self.upstream_timeout, self.exchanger.verify(&access_token))
            .await
            .map_err(|_| AuthError::VerificationFailed("token verification timed out".to_string()))?
    }
}

/// The two contexts the service runs side by side.
#[derive(Clone)]
pub struct AuthContexts {
    login: AuthContext,
    registration: AuthContext,
}

impl AuthContexts {
    /// # Errors
    ///
    /// Returns a configuration error if a context is passed in the slot of
    /// the other purpose.
    pub fn new(
        login: AuthContext,
        registration: AuthContext,
    ) -> std::result::Result<Self, crate::error::AuthError> {
        for (context, slot) in [
            (&login, AuthPurpose::Login),
            (&registration, AuthPurpose::Registration),
        ] {
            if context.purpose() != slot {
                return Err(crate::error::AuthError::Config(format!(
                    "{} context passed in the {slot} slot",
                    context.purpose()
                )));
            }
        }

        Ok(Self {
            login,
            registration,
        })
    }

    /// Context serving `purpose`.
    pub fn get(&self, purpose: AuthPurpose) -> &AuthContext {
        match purpose {
            AuthPurpose::Login => &self.login,
            AuthPurpose::Registration => &self.registration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockProvider;
    use evefreight_core::auth::{CharacterId, REGISTRATION_SCOPES};

    fn mock(client_id: &str) -> MockProvider {
        MockProvider::new(
            client_id,
            Url::parse("https://sso.mock/oauth/authorize").unwrap(),
        )
    }

    fn contexts() -> AuthContexts {
        let timeout = Duration::from_secs(1);
        AuthContexts::new(
            AuthContext::login(Arc::new(mock("login-client")), timeout),
            AuthContext::registration(Arc::new(mock("reg-client")), timeout),
        )
        .unwrap()
    }

    #[test]
    fn test_contexts_are_selected_by_purpose() {
        let contexts = contexts();
        assert_eq!(contexts.get(AuthPurpose::Login).client_id(), "login-client");
        assert!(contexts.get(AuthPurpose::Login).scopes().is_empty());
        assert_eq!(
            contexts.get(AuthPurpose::Registration).client_id(),
            "reg-client"
        );
        assert_eq!(
            contexts.get(AuthPurpose::Registration).scopes().len(),
            REGISTRATION_SCOPES.len()
        );
    }

    #[test]
    fn test_swapped_contexts_are_config_error() {
        let timeout = Duration::from_secs(1);
        let result = AuthContexts::new(
            AuthContext::registration(Arc::new(mock("reg")), timeout),
            AuthContext::login(Arc::new(mock("login")), timeout),
        );

        assert!(matches!(result, Err(crate::error::AuthError::Config(_))));
    }

    #[test]
    fn test_duplicate_purpose_is_config_error() {
        let timeout = Duration::from_secs(1);
        let result = AuthContexts::new(
            AuthContext::login(Arc::new(mock("login")), timeout),
            AuthContext::login(Arc::new(mock("other")), timeout),
        );

        assert!(matches!(result, Err(crate::error::AuthError::Config(_))));
    }

    #[test]
    fn test_registration_url_joins_scopes() {
        let contexts = contexts();
        let url = contexts
            .get(AuthPurpose::Registration)
            .authorization_url("s")
            .unwrap();
        let scope = url
            .query_pairs()
            .find(|(k, _)| k == "scope")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(scope, REGISTRATION_SCOPES.join(" "));
    }

    #[tokio::test]
    async fn test_exchange_timeout_is_exchange_failure() {
        let context = AuthContext::login(
            Arc::new(mock("slow").with_delay(Duration::from_millis(200))),
            Duration::from_millis(20),
        );

        let result = context
            .exchange(&MockProvider::code_for(CharacterId::new(1)))
            .await;

        assert!(matches!(result, Err(AuthError::ExchangeFailed(_))));
    }

    #[tokio::test]
    async fn test_verify_timeout_is_verification_failure() {
        let fast = AuthContext::login(Arc::new(mock("c")), Duration::from_secs(1));
        let token = fast.exchange("char-3").await.unwrap();

        let slow = AuthContext::login(
            Arc::new(mock("c").with_delay(Duration::from_millis(200))),
            Duration::from_millis(20),
        );
        let source = slow.token_source(token).unwrap();

        assert!(matches!(
            slow.verify(&source).await,
            Err(AuthError::VerificationFailed(_))
        ));
    }
}
