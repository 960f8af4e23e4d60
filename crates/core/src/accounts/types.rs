use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthPurpose, CharacterId, Token};

/// A user's account with the service, anchored on its main character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub main_character_id: CharacterId,
}

/// Token set held for a character, one per SSO application.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EsiKeys {
    pub character_id: CharacterId,
    pub purpose: AuthPurpose,
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl EsiKeys {
    pub fn from_token(character_id: CharacterId, purpose: AuthPurpose, token: Token) -> Self {
        Self {
            character_id,
            purpose,
            access_token: token.access_token,
            token_type: token.token_type,
            refresh_token: token.refresh_token,
            expiry: token.expiry,
        }
    }
}

impl std::fmt::Debug for EsiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsiKeys")
            .field("character_id", &self.character_id)
            .field("purpose", &self.purpose)
            .field("token_type", &self.token_type)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}
