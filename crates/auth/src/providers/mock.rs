//! Mock SSO provider for development and testing.
//!
//! Authorization codes have the form `char-<id>`; the exchanged access token
//! embeds the same id so that `verify` resolves it back to that character.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use evefreight_core::auth::{
    AuthError, CharacterId, Result, Token, TokenExchanger, VerifiedCharacter,
};
use url::Url;

const CODE_PREFIX: &str = "char-";
const ACCESS_PREFIX: &str = "mock-access-";
const REFRESH_PREFIX: &str = "mock-refresh-";

/// A code exchange observed by a [`MockProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeCall {
    pub client_id: String,
    pub code: String,
}

/// Mock provider standing in for one SSO application.
#[derive(Clone)]
pub struct MockProvider {
    client_id: String,
    authorize_url: Url,
    auto_approve: Option<CharacterId>,
    delay: Option<Duration>,
    token_type: String,
    token_lifetime: chrono::Duration,
    fail_verify: bool,
    calls: Arc<Mutex<Vec<ExchangeCall>>>,
}

impl MockProvider {
    /// Create a new MockProvider.
    ///
    /// # Arguments
    /// * `client_id` - Client id the provider reports and records on exchange
    /// * `authorize_url` - Base of the generated authorization URLs
    pub fn new(client_id: impl Into<String>, authorize_url: Url) -> Self {
        Self {
            client_id: client_id.into(),
            authorize_url,
            auto_approve: None,
            delay: None,
            token_type: "Bearer".to_string(),
            token_lifetime: chrono::Duration::minutes(20),
            fail_verify: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append a ready-made `code` for `character` to every authorization URL,
    /// so pointing the URL at the app's callback approves the flow directly.
    pub fn with_auto_approve(mut self, character: CharacterId) -> Self {
        self.auto_approve = Some(character);
        self
    }

    /// Delay every exchange and verification.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Token type reported by exchanges.
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    /// Lifetime of issued access tokens.
    pub fn with_token_lifetime(mut self, lifetime: chrono::Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Make every verification fail.
    pub fn with_failing_verify(mut self) -> Self {
        self.fail_verify = true;
        self
    }

    /// Code the provider accepts for `character`.
    pub fn code_for(character: CharacterId) -> String {
        format!("{CODE_PREFIX}{character}")
    }

    /// Code exchanges observed so far.
    pub fn calls(&self) -> Vec<ExchangeCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn issue(&self, character: &str) -> Token {
        Token {
            access_token: format!("{ACCESS_PREFIX}{character}"),
            token_type: self.token_type.clone(),
            refresh_token: Some(format!("{REFRESH_PREFIX}{character}")),
            expiry: Some(Utc::now() + self.token_lifetime),
        }
    }
}

fn parse_character(value: &str, prefix: &str) -> Option<CharacterId> {
    value
        .strip_prefix(prefix)
        .and_then(|id| id.parse::<i64>().ok())
        .map(CharacterId::new)
}

#[async_trait]
impl TokenExchanger for MockProvider {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn authorization_url(&self, state: &str, scopes: &[String]) -> Result<Url> {
        let mut url = self.authorize_url.clone();

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("state", state)
            .append_pair("scope", &scopes.join(" "));

        if let Some(character) = self.auto_approve {
            url.query_pairs_mut()
                .append_pair("code", &Self::code_for(character));
        }

        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> Result<Token> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ExchangeCall {
                client_id: self.client_id.clone(),
                code: code.to_string(),
            });

        self.pause().await;

        let character = parse_character(code, CODE_PREFIX)
            .ok_or_else(|| AuthError::ExchangeFailed(format!("unknown code {code}")))?;

        Ok(self.issue(&character.to_string()))
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<Token> {
        let character = parse_character(refresh_token, REFRESH_PREFIX).ok_or_else(|| {
            AuthError::TokenSourceFailed("unknown refresh token".to_string())
        })?;

        let mut token = self.issue(&character.to_string());
        token.access_token = format!("{}-refreshed", token.access_token);
        Ok(token)
    }

    async fn verify(&self, access_token: &str) -> Result<VerifiedCharacter> {
        self.pause().await;

        if self.fail_verify {
            return Err(AuthError::VerificationFailed(
                "mock verification disabled".to_string(),
            ));
        }

        let id = access_token
            .strip_prefix(ACCESS_PREFIX)
            .map(|rest| rest.trim_end_matches("-refreshed"))
            .and_then(|id| id.parse::<i64>().ok())
            .map(CharacterId::new)
            .ok_or_else(|| AuthError::VerificationFailed("unknown access token".to_string()))?;

        Ok(VerifiedCharacter {
            character_id: id,
            character_name: format!("Mock Pilot {id}"),
            scopes: vec![],
            owner_hash: format!("mock-owner-{id}"),
        })
    }
}
