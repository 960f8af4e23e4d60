//! Account collaborator contracts.
//!
//! The SSO core only hands verified character ids to these traits; the
//! account and key models themselves belong to the storage layer.

mod error;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use traits::{AccountRepository, EsiKeyRepository};
pub use types::{Account, EsiKeys};
