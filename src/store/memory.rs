use std::sync::RwLock;

use chrono::Utc;
use futures::future::{ready, BoxFuture, FutureExt};

use super::{StoreError, UserStore};
use crate::models::{AccountStatus, CredentialRecord, NewUser};

/// `UserStore` kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    records: RwLock<Vec<CredentialRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fully formed record, replacing any record with the same id.
    pub fn put(&self, record: CredentialRecord) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.retain(|r| r.id != record.id);
        records.push(record);
    }

    pub fn set_status(&self, id: i32, status: AccountStatus) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            record.status = status;
        }
    }

    pub fn remove(&self, id: i32) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.retain(|r| r.id != id);
    }

    fn lookup(&self, predicate: impl Fn(&CredentialRecord) -> bool) -> Option<CredentialRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.iter().find(|r| predicate(*r)).cloned()
    }
}

impl UserStore for MemoryUserStore {
    fn find_by_identifier<'a>(
        &'a self,
        identifier: &'a str,
    ) -> BoxFuture<'a, Result<Option<CredentialRecord>, StoreError>> {
        let found = self.lookup(|r| r.email.eq_ignore_ascii_case(identifier));
        ready(Ok(found)).boxed()
    }

    fn find_by_id(&self, id: i32) -> BoxFuture<'_, Result<Option<CredentialRecord>, StoreError>> {
        ready(Ok(self.lookup(|r| r.id == id))).boxed()
    }

    fn insert(&self, user: NewUser) -> BoxFuture<'_, Result<CredentialRecord, StoreError>> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        let result = if records.iter().any(|r| r.email.eq_ignore_ascii_case(&user.email)) {
            Err(StoreError::Conflict("Email already exists"))
        } else {
            let record = CredentialRecord {
                id: records.iter().map(|r| r.id).max().unwrap_or(0) + 1,
                name: user.name,
                email: user.email,
                password_hash: user.password_hash,
                status: AccountStatus::Active,
                created_at: Utc::now(),
            };
            records.push(record.clone());
            Ok(record)
        };
        ready(result).boxed()
    }
}
