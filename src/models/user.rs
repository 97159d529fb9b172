use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Whether an account may log in.
/// Corresponds to the `account_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "account_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
}

/// A stored account, including the bcrypt hash. Never serialized to clients.
#[derive(Debug, Clone, FromRow)]
pub struct CredentialRecord {
    pub id: i32,
    pub name: String,
    /// The login identifier. Unique, compared case-insensitively.
    pub email: String,
    pub password_hash: String,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// The public view of an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<&CredentialRecord> for User {
    fn from(record: &CredentialRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
        }
    }
}

/// An account about to be inserted. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
