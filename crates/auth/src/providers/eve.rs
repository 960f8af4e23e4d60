//! EVE Online SSO provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use evefreight_core::auth::{
    parse_scopes, AuthError, CharacterId, Result, Token, TokenExchanger, VerifiedCharacter,
};
use oauth2::{
    basic::{BasicClient, BasicTokenResponse},
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, RefreshToken, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use url::Url;

use crate::config::SsoAppConfig;

/// Client with the authorize and token endpoints set, as the SSO v1 API needs.
type ConfiguredBasicClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

const AUTHORIZE_PATH: &str = "/oauth/authorize";
const TOKEN_PATH: &str = "/oauth/token";
const VERIFY_PATH: &str = "/oauth/verify";

/// Body of the verify endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VerifyResponse {
    #[serde(rename = "CharacterID")]
    character_id: i64,
    character_name: String,
    #[serde(default)]
    scopes: String,
    #[serde(default)]
    character_owner_hash: String,
}

/// One registered EVE SSO application.
pub struct EveSsoProvider {
    client: ConfiguredBasicClient,
    http_client: reqwest::Client,
    verify_url: Url,
    client_id: String,
}

impl EveSsoProvider {
    /// Create a provider for the application described by `app`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URLs cannot be derived from
    /// `sso_base_url` or the HTTP client cannot be built.
    pub fn new(
        app: &SsoAppConfig,
        sso_base_url: &Url,
        redirect_uri: Url,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint = |path: &str| {
            sso_base_url
                .join(path)
                .map_err(|e| AuthError::Provider(format!("invalid SSO url: {e}")))
        };

        // Build HTTP client without redirect following (security requirement)
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .user_agent(concat!("eve-freight/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AuthError::Provider(format!("Failed to build HTTP client: {e}")))?;

        let client = BasicClient::new(ClientId::new(app.client_id.clone()))
            .set_client_secret(ClientSecret::new(app.client_secret.clone()))
            .set_auth_uri(AuthUrl::from_url(endpoint(AUTHORIZE_PATH)?))
            .set_token_uri(TokenUrl::from_url(endpoint(TOKEN_PATH)?))
            .set_redirect_uri(RedirectUrl::from_url(redirect_uri));

        Ok(Self {
            client,
            http_client,
            verify_url: endpoint(VERIFY_PATH)?,
            client_id: app.client_id.clone(),
        })
    }
}

fn token_from_response(response: &BasicTokenResponse) -> Token {
    Token {
        access_token: response.access_token().secret().clone(),
        token_type: response.token_type().as_ref().to_string(),
        refresh_token: response.refresh_token().map(|t| t.secret().clone()),
        expiry: response
            .expires_in()
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .and_then(|d| Utc::now().checked_add_signed(d)),
    }
}

#[async_trait]
impl TokenExchanger for EveSsoProvider {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn authorization_url(&self, state: &str, scopes: &[String]) -> Result<Url> {
        let state_owned = state.to_string();

        // The scope parameter is sent even when empty; the SSO expects it.
        let (auth_url, _csrf_token) = self
            .client
            .authorize_url(move || CsrfToken::new(state_owned))
            .add_extra_param("scope", scopes.join(" "))
            .add_extra_param("access_type", "offline")
            .url();

        Ok(auth_url)
    }

    async fn exchange_code(&self, code: &str) -> Result<Token> {
        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| AuthError::ExchangeFailed(e.to_string()))?;

        Ok(token_from_response(&response))
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<Token> {
        let response = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| AuthError::TokenSourceFailed(format!("refresh failed: {e}")))?;

        Ok(token_from_response(&response))
    }

    async fn verify(&self, access_token: &str) -> Result<VerifiedCharacter> {
        let response = self
            .http_client
            .get(self.verify_url.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::VerificationFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::VerificationFailed(format!(
                "verify endpoint returned {status}: {body}"
            )));
        }

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|e| AuthError::VerificationFailed(format!("invalid verify response: {e}")))?;

        Ok(VerifiedCharacter {
            character_id: CharacterId::new(body.character_id),
            character_name: body.character_name,
            scopes: parse_scopes(&body.scopes),
            owner_hash: body.character_owner_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app() -> SsoAppConfig {
        SsoAppConfig {
            client_id: "reg-client".to_string(),
            client_secret: "reg-secret".to_string(),
        }
    }

    fn provider(base: &str, timeout: Duration) -> EveSsoProvider {
        EveSsoProvider::new(
            &app(),
            &Url::parse(base).unwrap(),
            Url::parse("https://freight.example.com/auth/callback").unwrap(),
            timeout,
        )
        .unwrap()
    }

    fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_authorization_url_carries_oauth_parameters() {
        let provider = provider("https://login.eveonline.com", Duration::from_secs(5));
        let scopes = vec!["publicData".to_string(), "esi-skills.read_skills.v1".to_string()];

        let url = provider.authorization_url("state-123", &scopes).unwrap();

        assert_eq!(url.path(), "/oauth/authorize");
        assert_eq!(query_value(&url, "response_type").as_deref(), Some("code"));
        assert_eq!(query_value(&url, "client_id").as_deref(), Some("reg-client"));
        assert_eq!(query_value(&url, "state").as_deref(), Some("state-123"));
        assert_eq!(
            query_value(&url, "scope").as_deref(),
            Some("publicData esi-skills.read_skills.v1")
        );
        assert_eq!(query_value(&url, "access_type").as_deref(), Some("offline"));
        assert_eq!(
            query_value(&url, "redirect_uri").as_deref(),
            Some("https://freight.example.com/auth/callback")
        );
    }

    #[test]
    fn test_authorization_url_keeps_empty_scope() {
        let provider = provider("https://login.eveonline.com", Duration::from_secs(5));

        let url = provider.authorization_url("s", &[]).unwrap();

        assert_eq!(query_value(&url, "scope").as_deref(), Some(""));
        assert_eq!(url.query_pairs().filter(|(k, _)| k == "scope").count(), 1);
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=the-code"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-1",
                "token_type": "Bearer",
                "expires_in": 1199,
                "refresh_token": "refresh-1",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server.uri(), Duration::from_secs(5));
        let token = provider.exchange_code("the-code").await.unwrap();

        assert_eq!(token.access_token, "access-1");
        assert!(token.token_type.eq_ignore_ascii_case("bearer"));
        assert_eq!(token.refresh_token.as_deref(), Some("refresh-1"));
        assert!(token.expiry.unwrap() > Utc::now());
    }

    #[tokio::test]
    async fn test_exchange_code_with_unrepresentable_lifetime() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-1",
                "token_type": "Bearer",
                "expires_in": 9_000_000_000_000_u64,
            })))
            .mount(&server)
            .await;

        let provider = provider(&server.uri(), Duration::from_secs(5));
        let token = provider.exchange_code("the-code").await.unwrap();

        assert_eq!(token.access_token, "access-1");
        assert_eq!(token.expiry, None);
    }

    #[tokio::test]
    async fn test_exchange_code_rejected_by_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Authorization code expired",
            })))
            .mount(&server)
            .await;

        let provider = provider(&server.uri(), Duration::from_secs(5));
        let result = provider.exchange_code("stale").await;

        assert!(matches!(result, Err(AuthError::ExchangeFailed(_))));
    }

    #[tokio::test]
    async fn test_exchange_code_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "a", "token_type": "Bearer"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let provider = provider(&server.uri(), Duration::from_millis(100));
        let result = provider.exchange_code("slow").await;

        assert!(matches!(result, Err(AuthError::ExchangeFailed(_))));
    }

    #[tokio::test]
    async fn test_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-2",
                "token_type": "Bearer",
                "expires_in": 1199,
            })))
            .mount(&server)
            .await;

        let provider = provider(&server.uri(), Duration::from_secs(5));
        let token = provider.refresh_token("refresh-1").await.unwrap();

        assert_eq!(token.access_token, "access-2");
        assert_eq!(token.refresh_token, None);
    }

    #[tokio::test]
    async fn test_verify() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/verify"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "CharacterID": 95465499,
                "CharacterName": "CCP Bartender",
                "ExpiresOn": "2017-07-05T14:34:16.5857101",
                "Scopes": "esi-skills.read_skills.v1 esi-assets.read_assets.v1",
                "TokenType": "Character",
                "CharacterOwnerHash": "lots_of_letters_and_numbers",
                "IntellectualProperty": "EVE",
            })))
            .mount(&server)
            .await;

        let provider = provider(&server.uri(), Duration::from_secs(5));
        let character = provider.verify("access-1").await.unwrap();

        assert_eq!(character.character_id, CharacterId::new(95465499));
        assert_eq!(character.character_name, "CCP Bartender");
        assert_eq!(
            character.scopes,
            vec!["esi-skills.read_skills.v1", "esi-assets.read_assets.v1"]
        );
        assert_eq!(character.owner_hash, "lots_of_letters_and_numbers");
    }

    #[tokio::test]
    async fn test_verify_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/verify"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = provider(&server.uri(), Duration::from_secs(5));
        let result = provider.verify("revoked").await;

        assert!(matches!(result, Err(AuthError::VerificationFailed(_))));
    }
}
