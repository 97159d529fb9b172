use crate::error::AppError;
use bcrypt::{hash, verify};
use log::warn;

/// Compares a submitted password against a stored hash.
///
/// The authority takes this as a trait object so tests can substitute a
/// deterministic comparison without touching bcrypt.
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, password: &str, password_hash: &str) -> bool;
}

/// bcrypt hashing and verification at a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct Bcrypt {
    cost: u32,
}

impl Bcrypt {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
    }
}

impl Default for Bcrypt {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordVerifier for Bcrypt {
    /// A malformed stored hash counts as a mismatch and is logged.
    fn verify(&self, password: &str, password_hash: &str) -> bool {
        match verify(password, password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                warn!("stored password hash could not be checked: {}", e);
                false
            }
        }
    }
}
