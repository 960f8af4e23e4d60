mod error;
mod functions;
pub mod machine;
mod scopes;
mod traits;
mod types;

pub use error::AuthError;
pub use functions::{
    generate_session_id, generate_state, is_session_expired, is_token_expired, parse_scopes,
};
pub use scopes::{registration_scopes, REGISTRATION_SCOPES};
pub use traits::{Result, SessionRepository, TokenExchanger};
pub use types::{
    AuthPurpose, CharacterId, SessionId, SessionRecord, SessionState, Token, VerifiedCharacter,
};
