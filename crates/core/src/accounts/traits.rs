use async_trait::async_trait;

use crate::auth::{AuthPurpose, CharacterId};

use super::{Account, EsiKeys, Result};

/// Repository for accounts keyed by their main character.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Returns the account whose main character is `character_id`,
    /// creating it on first sight.
    async fn get_or_create_account(&self, character_id: CharacterId) -> Result<Account>;
}

/// Repository for the token sets obtained by completed flows.
#[async_trait]
pub trait EsiKeyRepository: Send + Sync {
    /// Stores keys, replacing those held for the same character and purpose.
    async fn save_keys(&self, keys: &EsiKeys) -> Result<()>;

    /// Gets the keys held for a character and purpose.
    async fn get_keys(
        &self,
        character_id: CharacterId,
        purpose: AuthPurpose,
    ) -> Result<Option<EsiKeys>>;
}
