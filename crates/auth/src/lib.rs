//! EVE SSO authentication for eve-freight.
//!
//! This crate provides:
//! - Two auth contexts (login and registration) over the EVE SSO OAuth2 flow
//! - The SSO flow controller binding state tokens to server-side sessions
//! - Signed-cookie session storage with per-session serialization
//! - Axum routes and extractors for authentication

mod config;
mod context;
mod error;
mod extractors;
mod flow;
mod handlers;
mod providers;
mod sessions;
mod state;
mod token_source;

pub use config::{AuthConfig, SsoAppConfig, CALLBACK_PATH, DEFAULT_COOKIE_NAME, DEFAULT_SSO_BASE_URL};
pub use context::{AuthContext, AuthContexts};
pub use error::AuthError;
pub use flow::{CallbackQuery, CompletedFlow, SsoFlow};
pub use handlers::auth_routes;
pub use providers::EveSsoProvider;
#[cfg(any(test, feature = "mock"))]
pub use providers::{ExchangeCall, MockProvider};
pub use sessions::{InMemorySessionRepository, Session, SessionLocks, SessionStore};
pub use state::AuthState;
pub use token_source::{AuthenticatedApi, TokenSource};
