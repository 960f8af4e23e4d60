//! Per-session locks serializing read-modify-write of one session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError, Weak};

use evefreight_core::auth::SessionId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Entries are pruned once the table grows past this many sessions.
const PRUNE_THRESHOLD: usize = 1024;

/// Table of async locks keyed by session id.
///
/// Only weak references are kept, so a lock disappears once no request
/// holds or waits for it.
#[derive(Debug, Clone, Default)]
pub struct SessionLocks {
    locks: Arc<StdMutex<HashMap<SessionId, Weak<Mutex<()>>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`.
    pub async fn acquire(&self, id: &SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

            if locks.len() >= PRUNE_THRESHOLD {
                locks.retain(|_, lock| lock.strong_count() > 0);
            }

            match locks.get(id).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(Mutex::new(()));
                    locks.insert(id.clone(), Arc::downgrade(&lock));
                    lock
                }
            }
        };

        lock.lock_owned().await
    }

    /// Number of sessions currently tracked, live or not yet pruned.
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
