//! HTTP handlers for auth routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::SignedCookieJar;
use evefreight_core::accounts::EsiKeys;
use evefreight_core::auth::AuthError as CoreError;

use crate::config::CALLBACK_PATH;
use crate::error::AuthError;
use crate::flow::{CallbackQuery, CompletedFlow};
use crate::sessions::Session;
use crate::AuthState;

/// Creates the auth router.
///
/// Routes:
/// - `GET /login` - Forget the current identity and start the login flow
/// - `GET /auth/callback` - Complete whichever flow the session started
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/login", get(login))
        .route(CALLBACK_PATH, get(callback))
}

async fn login(
    State(state): State<AuthState>,
    jar: SignedCookieJar,
    mut session: Session,
) -> Result<(SignedCookieJar, Redirect), AuthError> {
    let url = state.flow.start_login(&mut session).await?;
    Ok((jar.add(session.cookie()), Redirect::to(url.as_str())))
}

async fn callback(
    State(state): State<AuthState>,
    Query(query): Query<CallbackQuery>,
    jar: SignedCookieJar,
    mut session: Session,
) -> Result<(SignedCookieJar, Redirect), AuthError> {
    let completed = state.flow.complete_flow(&mut session, &query).await?;

    let account = state
        .accounts
        .get_or_create_account(completed.character.character_id)
        .await
        .map_err(|e| CoreError::Storage(e.to_string()))?;

    tracing::info!(
        account_id = account.id,
        character_id = %completed.character.character_id,
        character_name = %completed.character.character_name,
        purpose = %completed.purpose,
        "Character signed in"
    );

    store_keys(&state, &completed).await;

    Ok((jar.add(session.cookie()), Redirect::to("/")))
}

async fn store_keys(state: &AuthState, completed: &CompletedFlow) {
    let token = completed.api.token_source.token().await;
    let keys = EsiKeys::from_token(completed.api.character_id, completed.api.purpose, token);

    if let Err(e) = state.keys.save_keys(&keys).await {
        tracing::error!(
            error = %e,
            character_id = %keys.character_id,
            purpose = %keys.purpose,
            "Failed to store ESI keys"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, SsoAppConfig};
    use crate::context::{AuthContext, AuthContexts};
    use crate::providers::MockProvider;
    use crate::sessions::InMemorySessionRepository;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use evefreight_core::accounts::{
        Account, AccountRepository, EsiKeyRepository, RepositoryError, Result as RepoResult,
    };
    use evefreight_core::auth::{AuthPurpose, CharacterId};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tower::ServiceExt;
    use url::Url;

    #[derive(Default)]
    struct RecordingAccounts {
        fail: bool,
        seen: Mutex<Vec<CharacterId>>,
    }

    #[async_trait]
    impl AccountRepository for RecordingAccounts {
        async fn get_or_create_account(&self, character_id: CharacterId) -> RepoResult<Account> {
            if self.fail {
                return Err(RepositoryError::ConnectionFailed("down".to_string()));
            }
            self.seen.lock().unwrap().push(character_id);
            Ok(Account {
                id: 1,
                main_character_id: character_id,
            })
        }
    }

    #[derive(Default)]
    struct RecordingKeys {
        fail: bool,
        keys: Mutex<HashMap<(CharacterId, AuthPurpose), EsiKeys>>,
    }

    #[async_trait]
    impl EsiKeyRepository for RecordingKeys {
        async fn save_keys(&self, keys: &EsiKeys) -> RepoResult<()> {
            if self.fail {
                return Err(RepositoryError::QueryFailed("read-only".to_string()));
            }
            self.keys
                .lock()
                .unwrap()
                .insert((keys.character_id, keys.purpose), keys.clone());
            Ok(())
        }

        async fn get_keys(
            &self,
            character_id: CharacterId,
            purpose: AuthPurpose,
        ) -> RepoResult<Option<EsiKeys>> {
            Ok(self.keys.lock().unwrap().get(&(character_id, purpose)).cloned())
        }
    }

    fn app(accounts: RecordingAccounts, keys: Arc<RecordingKeys>) -> Router {
        let sso = SsoAppConfig {
            client_id: "unused".to_string(),
            client_secret: "unused".to_string(),
        };
        let config = AuthConfig::new(
            sso.clone(),
            sso,
            Url::parse("http://localhost:8000").unwrap(),
            "k".repeat(64),
        )
        .unwrap();
        let authorize = Url::parse("https://sso.mock/oauth/authorize").unwrap();
        let timeout = Duration::from_secs(1);
        let contexts = AuthContexts::new(
            AuthContext::login(
                Arc::new(MockProvider::new("login-client", authorize.clone())),
                timeout,
            ),
            AuthContext::registration(
                Arc::new(MockProvider::new("reg-client", authorize)),
                timeout,
            ),
        )
        .unwrap();
        let state = AuthState::new(
            config,
            contexts,
            Arc::new(InMemorySessionRepository::new()),
            Arc::new(accounts),
            keys,
        )
        .unwrap();

        auth_routes().with_state(state)
    }

    fn session_cookie(response: &axum::response::Response) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    fn location(response: &axum::response::Response) -> Url {
        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap();
        Url::parse(location).unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn start_login(app: &Router) -> (String, String) {
        let response = app.clone().oneshot(get("/login", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let state = location(&response)
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        (session_cookie(&response), state)
    }

    #[tokio::test]
    async fn test_login_redirects_to_provider() {
        let app = app(RecordingAccounts::default(), Arc::default());

        let response = app.oneshot(get("/login", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let url = location(&response);
        assert_eq!(url.host_str(), Some("sso.mock"));
        assert!(url.query().unwrap().contains("client_id=login-client"));
        assert!(session_cookie(&response).starts_with("eve-freight="));
    }

    #[tokio::test]
    async fn test_callback_signs_in_and_stores_keys() {
        let keys = Arc::new(RecordingKeys::default());
        let app = app(RecordingAccounts::default(), keys.clone());
        let (cookie, state) = start_login(&app).await;

        let response = app
            .oneshot(get(
                &format!("/auth/callback?code=char-42&state={state}"),
                Some(&cookie),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
        let stored = keys
            .get_keys(CharacterId::new(42), AuthPurpose::Login)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.access_token, "mock-access-42");
    }

    #[tokio::test]
    async fn test_callback_without_flow_is_bad_request() {
        let app = app(RecordingAccounts::default(), Arc::default());

        let response = app
            .oneshot(get("/auth/callback?code=char-1&state=x", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_callback_with_forged_state_is_bad_request() {
        let app = app(RecordingAccounts::default(), Arc::default());
        let (cookie, _state) = start_login(&app).await;

        let response = app
            .oneshot(get(
                "/auth/callback?code=char-1&state=forged",
                Some(&cookie),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_callback_with_bad_code_is_bad_gateway() {
        let app = app(RecordingAccounts::default(), Arc::default());
        let (cookie, state) = start_login(&app).await;

        let response = app
            .oneshot(get(
                &format!("/auth/callback?code=garbage&state={state}"),
                Some(&cookie),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_account_failure_is_internal_error() {
        let accounts = RecordingAccounts {
            fail: true,
            ..Default::default()
        };
        let app = app(accounts, Arc::default());
        let (cookie, state) = start_login(&app).await;

        let response = app
            .oneshot(get(
                &format!("/auth/callback?code=char-42&state={state}"),
                Some(&cookie),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_key_store_failure_does_not_fail_login() {
        let keys = Arc::new(RecordingKeys {
            fail: true,
            ..Default::default()
        });
        let app = app(RecordingAccounts::default(), keys);
        let (cookie, state) = start_login(&app).await;

        let response = app
            .oneshot(get(
                &format!("/auth/callback?code=char-42&state={state}"),
                Some(&cookie),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}
