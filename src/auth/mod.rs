pub mod authority;
pub mod extractors;
pub mod guard;
pub mod middleware;
pub mod password;
pub mod token;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

// Re-export necessary items
pub use authority::Authority;
pub use extractors::AuthenticatedUser;
pub use guard::{bearer_token, Decision, Guard};
pub use middleware::RequireAuth;
pub use password::{Bcrypt, PasswordVerifier};
pub use token::{AccessToken, Claims, TokenSigner};

lazy_static! {
    // Display names: letters, digits, spaces, underscores, hyphens
    static ref NAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_ -]+$").unwrap();
}

/// Failures of credential checks, token handling and request gating.
#[derive(Debug)]
pub enum AuthError {
    /// No account has the submitted identifier.
    NotFound,
    /// The account exists but is disabled.
    InactiveAccount,
    /// The password does not match the stored hash.
    InvalidCredentials,
    /// Missing, malformed, forged or expired token, or an unknown subject.
    Unauthenticated(String),
    /// Key material is missing or unusable.
    SigningError(String),
    /// The user store could not be queried.
    StoreUnavailable(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::NotFound => write!(f, "user not found"),
            AuthError::InactiveAccount => write!(f, "user is inactive"),
            AuthError::InvalidCredentials => write!(f, "invalid password"),
            AuthError::Unauthenticated(reason) => write!(f, "unauthenticated: {}", reason),
            AuthError::SigningError(reason) => write!(f, "signing error: {}", reason),
            AuthError::StoreUnavailable(reason) => write!(f, "user store unavailable: {}", reason),
        }
    }
}

impl std::error::Error for AuthError {}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// The account's login identifier. `identifier` is accepted as an alias.
    #[serde(alias = "identifier")]
    #[validate(email)]
    pub email: String,
    /// Any non-empty password; strength rules apply only at registration.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name, 3 to 50 characters.
    #[validate(
        length(min = 3, max = 50),
        regex(
            path = "NAME_REGEX",
            message = "Name must contain only letters, digits, spaces, underscores, or hyphens"
        )
    )]
    pub name: String,
    #[validate(email)]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Response returned by a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The signed access token, sent back as `Authorization: Bearer <token>`.
    pub token: String,
    /// The unique identifier of the authenticated user.
    pub user_id: i32,
    pub expires_at: DateTime<Utc>,
}

impl From<AccessToken> for AuthResponse {
    fn from(token: AccessToken) -> Self {
        Self {
            expires_at: token.expires_at(),
            user_id: token.claims.sub,
            token: token.token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "p".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());

        let empty_password_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "".to_string(),
        };
        assert!(empty_password_login.validate().is_err());
    }

    #[test]
    fn test_login_request_accepts_identifier_alias() {
        let login: LoginRequest =
            serde_json::from_str(r#"{"identifier":"a@example.com","password":"x"}"#).unwrap();
        assert_eq!(login.email, "a@example.com");
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            name: "Test User-123".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_register.validate().is_ok());

        let invalid_name_register = RegisterRequest {
            name: "test user!".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_name_register.validate().is_err());

        let short_name_register = RegisterRequest {
            name: "tu".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(short_name_register.validate().is_err());

        let short_password_register = RegisterRequest {
            name: "tester".to_string(),
            email: "test@example.com".to_string(),
            password: "12345".to_string(),
        };
        assert!(short_password_register.validate().is_err());
    }
}
