//! In-memory storage backend.
//!
//! Keeps accounts and ESI keys in HashMaps wrapped in `Arc<RwLock<_>>`.
//! Nothing survives a restart.

mod repository;

pub use repository::{InMemoryAccountRepository, InMemoryEsiKeyRepository};
