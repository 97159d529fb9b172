use std::sync::Arc;

use actix_web::web;
use log::{debug, error, info};

use super::password::PasswordVerifier;
use super::token::{AccessToken, TokenSigner};
use super::AuthError;
use crate::store::UserStore;

/// Verifies credentials and mints access tokens.
#[derive(Clone)]
pub struct Authority {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenSigner>,
    passwords: Arc<dyn PasswordVerifier>,
}

impl Authority {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<TokenSigner>,
        passwords: Arc<dyn PasswordVerifier>,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
        }
    }

    /// Checks `identifier`/`password` and returns a token for the account.
    ///
    /// An unknown identifier is reported as `NotFound` and an inactive
    /// account as `InactiveAccount`, even when the password is right.
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AccessToken, AuthError> {
        let record = self
            .users
            .find_by_identifier(identifier)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?
            .ok_or(AuthError::NotFound)?;

        if !record.is_active() {
            debug!("login refused for inactive user {}", record.id);
            return Err(AuthError::InactiveAccount);
        }

        if !self.verify_password(password, &record.password_hash).await {
            debug!("login refused for user {}: password mismatch", record.id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issue_token(record.id, &record.email)?;
        info!("user {} logged in", record.id);
        Ok(token)
    }

    /// Runs the comparison on the blocking pool, off the request worker.
    /// A comparison that never completes counts as a mismatch.
    async fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        let passwords = Arc::clone(&self.passwords);
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        web::block(move || passwords.verify(&password, &password_hash))
            .await
            .unwrap_or_else(|e| {
                error!("password check did not complete: {}", e);
                false
            })
    }

    pub fn issue_token(&self, subject_id: i32, email: &str) -> Result<AccessToken, AuthError> {
        self.tokens.issue(subject_id, email)
    }
}
