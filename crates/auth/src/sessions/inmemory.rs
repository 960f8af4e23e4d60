//! In-memory session storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use evefreight_core::auth::{
    is_session_expired, Result, SessionId, SessionRecord, SessionRepository,
};

/// In-memory session repository for development and testing.
///
/// Stores session records in a HashMap wrapped in `Arc<RwLock<_>>`.
/// Expired records are pruned on every write. Data is not persisted and
/// will be lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<SessionId, SessionRecord>>>,
}

impl InMemorySessionRepository {
    /// Creates a new empty in-memory session repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).cloned())
    }

    async fn save(&self, id: &SessionId, record: &SessionRecord) -> Result<()> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, stored| !is_session_expired(stored, now));
        sessions.insert(id.clone(), record.clone());
        Ok(())
    }
}
