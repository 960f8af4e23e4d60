//! Functional core for eve-freight.
//!
//! Pure types, state transitions and collaborator traits. No I/O lives here;
//! the `evefreight_auth` crate and the `evefreight` binary provide the shell.

#[cfg(feature = "auth")]
pub mod accounts;
#[cfg(feature = "auth")]
pub mod auth;
