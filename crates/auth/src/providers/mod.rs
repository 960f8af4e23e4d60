//! SSO provider implementations.
//!
//! This module contains implementations of `TokenExchanger` for:
//! - EVE Online SSO
//! - A mock provider (tests and the `mock` feature)

mod eve;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use eve::EveSsoProvider;
#[cfg(any(test, feature = "mock"))]
pub use mock::{ExchangeCall, MockProvider};
