//! Storage backend implementations.
//!
//! Concrete implementations of the account and key repository traits
//! defined in `evefreight_core::accounts`.

pub mod inmemory;
