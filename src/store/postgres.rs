use futures::future::{BoxFuture, FutureExt};
use sqlx::PgPool;

use super::{StoreError, UserStore};
use crate::models::{CredentialRecord, NewUser};

const USER_COLUMNS: &str = "id, name, email, password_hash, status, created_at";

/// `UserStore` backed by the `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserStore for PgUserStore {
    fn find_by_identifier<'a>(
        &'a self,
        identifier: &'a str,
    ) -> BoxFuture<'a, Result<Option<CredentialRecord>, StoreError>> {
        async move {
            let sql = format!(
                "SELECT {} FROM users WHERE lower(email) = lower($1)",
                USER_COLUMNS
            );
            let record = sqlx::query_as::<_, CredentialRecord>(&sql)
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?;
            Ok(record)
        }
        .boxed()
    }

    fn find_by_id(&self, id: i32) -> BoxFuture<'_, Result<Option<CredentialRecord>, StoreError>> {
        async move {
            let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
            let record = sqlx::query_as::<_, CredentialRecord>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(record)
        }
        .boxed()
    }

    fn insert(&self, user: NewUser) -> BoxFuture<'_, Result<CredentialRecord, StoreError>> {
        async move {
            let sql = format!(
                "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
                USER_COLUMNS
            );
            sqlx::query_as::<_, CredentialRecord>(&sql)
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.password_hash)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| match e {
                    sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                        StoreError::Conflict("Email already exists")
                    }
                    other => StoreError::Database(other),
                })
        }
        .boxed()
    }
}
