//! In-memory repository implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use evefreight_core::accounts::{Account, AccountRepository, EsiKeyRepository, EsiKeys, Result};
use evefreight_core::auth::{AuthPurpose, CharacterId};

/// Accounts keyed by their main character.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<CharacterId, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn get_or_create_account(&self, character_id: CharacterId) -> Result<Account> {
        let mut accounts = self.accounts.write().await;
        let next_id = accounts.len() as i64 + 1;

        let account = accounts
            .entry(character_id)
            .or_insert_with(|| {
                tracing::info!(account_id = next_id, character_id = %character_id, "Created account");
                Account {
                    id: next_id,
                    main_character_id: character_id,
                }
            })
            .clone();

        Ok(account)
    }
}

/// ESI keys keyed by character and SSO application.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEsiKeyRepository {
    keys: Arc<RwLock<HashMap<(CharacterId, AuthPurpose), EsiKeys>>>,
}

impl InMemoryEsiKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EsiKeyRepository for InMemoryEsiKeyRepository {
    async fn save_keys(&self, keys: &EsiKeys) -> Result<()> {
        let mut stored = self.keys.write().await;
        stored.insert((keys.character_id, keys.purpose), keys.clone());
        Ok(())
    }

    async fn get_keys(
        &self,
        character_id: CharacterId,
        purpose: AuthPurpose,
    ) -> Result<Option<EsiKeys>> {
        let stored = self.keys.read().await;
        Ok(stored.get(&(character_id, purpose)).cloned())
    }
}
