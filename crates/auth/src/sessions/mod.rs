//! Session storage.
//!
//! - `SessionStore`: binds typed session state to a signed cookie
//! - `SessionLocks`: serializes overlapping requests of one session
//! - `InMemorySessionRepository`: `SessionRepository` kept in process memory

mod inmemory;
mod locks;
mod store;

pub use inmemory::InMemorySessionRepository;
pub use locks::SessionLocks;
pub use store::{Session, SessionStore};
