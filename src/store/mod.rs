//! Account storage.
//!
//! `UserStore` is the lookup collaborator the authority and the request guard
//! depend on. Production uses [`PgUserStore`]; tests and local experiments can
//! use [`MemoryUserStore`].

pub mod memory;
pub mod postgres;

use futures::future::BoxFuture;
use std::fmt;

use crate::models::{CredentialRecord, NewUser};

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// Failure of a store operation. "Not found" is never an error.
#[derive(Debug)]
pub enum StoreError {
    /// A uniqueness constraint was violated. Carries a client-facing message.
    Conflict(&'static str),
    Database(sqlx::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            StoreError::Database(e) => write!(f, "Database Error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        StoreError::Database(error)
    }
}

/// Lookup and creation of credential records.
pub trait UserStore: Send + Sync {
    /// Finds an account by its login identifier (email), case-insensitively.
    fn find_by_identifier<'a>(
        &'a self,
        identifier: &'a str,
    ) -> BoxFuture<'a, Result<Option<CredentialRecord>, StoreError>>;

    fn find_by_id(&self, id: i32) -> BoxFuture<'_, Result<Option<CredentialRecord>, StoreError>>;

    /// Inserts a new active account. A taken email yields `StoreError::Conflict`.
    fn insert(&self, user: NewUser) -> BoxFuture<'_, Result<CredentialRecord, StoreError>>;
}
