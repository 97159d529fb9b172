use std::sync::Arc;

use chrono::Utc;
use log::debug;

use super::extractors::AuthenticatedUser;
use super::token::TokenSigner;
use super::AuthError;
use crate::store::UserStore;

/// Outcome of evaluating one request.
#[derive(Debug)]
pub enum Decision {
    /// Proceed. Carries the resolved identity unless the endpoint is exempt.
    Allowed(Option<AuthenticatedUser>),
    Rejected(AuthError),
}

/// Per-request gate for protected endpoints.
///
/// Holds no request state; one instance is shared by every worker.
#[derive(Clone)]
pub struct Guard {
    tokens: Arc<TokenSigner>,
    users: Arc<dyn UserStore>,
}

impl Guard {
    pub fn new(tokens: Arc<TokenSigner>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    pub async fn check(&self, exempt: bool, authorization: Option<&str>) -> Decision {
        self.check_at(exempt, authorization, Utc::now().timestamp())
            .await
    }

    /// Evaluates the request as of `now` (seconds since epoch).
    ///
    /// Exempt endpoints are allowed before the header is even looked at.
    pub async fn check_at(&self, exempt: bool, authorization: Option<&str>, now: i64) -> Decision {
        if exempt {
            return Decision::Allowed(None);
        }
        match self.resolve(authorization, now).await {
            Ok(user) => Decision::Allowed(Some(user)),
            Err(e) => Decision::Rejected(e),
        }
    }

    async fn resolve(
        &self,
        authorization: Option<&str>,
        now: i64,
    ) -> Result<AuthenticatedUser, AuthError> {
        let token = authorization
            .ok_or_else(|| AuthError::Unauthenticated("Missing token".into()))
            .and_then(|header| {
                bearer_token(header)
                    .ok_or_else(|| AuthError::Unauthenticated("Malformed authorization header".into()))
            })?;

        let claims = self.tokens.verify_at(token, now)?;

        let record = self
            .users
            .find_by_identifier(&claims.email)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?
            .ok_or_else(|| AuthError::Unauthenticated("Token subject no longer exists".into()))?;

        if record.id != claims.sub {
            return Err(AuthError::Unauthenticated(
                "Token subject does not match account".into(),
            ));
        }

        debug!("request authenticated as user {}", record.id);
        Ok(AuthenticatedUser::from(&record))
    }
}

/// Extracts the credentials of a `Bearer` authorization header.
/// The scheme is matched case-insensitively.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::{test_keys, test_signer};
    use crate::models::{AccountStatus, CredentialRecord};
    use crate::store::MemoryUserStore;
    use chrono::Duration;
    use jsonwebtoken::Algorithm;

    fn store_with_user(id: i32, email: &str) -> Arc<MemoryUserStore> {
        let store = MemoryUserStore::new();
        store.put(CredentialRecord {
            id,
            name: "answer".to_string(),
            email: email.to_string(),
            password_hash: "unused".to_string(),
            status: AccountStatus::Active,
            created_at: Utc::now(),
        });
        Arc::new(store)
    }

    fn guard_for(store: Arc<MemoryUserStore>) -> (Guard, Arc<TokenSigner>) {
        let signer = Arc::new(test_signer());
        (Guard::new(signer.clone(), store), signer)
    }

    fn rejected(decision: &Decision) -> bool {
        matches!(decision, Decision::Rejected(AuthError::Unauthenticated(_)))
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer   abc"), Some("abc"));
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer a b"), None);
        assert_eq!(bearer_token("abc.def.ghi"), None);
    }

    #[actix_rt::test]
    async fn test_exempt_endpoint_skips_all_checks() {
        let (guard, _) = guard_for(store_with_user(42, "answer@example.com"));

        assert!(matches!(guard.check(true, None).await, Decision::Allowed(None)));
        assert!(matches!(
            guard.check(true, Some("Bearer garbage")).await,
            Decision::Allowed(None)
        ));
    }

    #[actix_rt::test]
    async fn test_missing_or_malformed_header_is_rejected() {
        let (guard, signer) = guard_for(store_with_user(42, "answer@example.com"));
        let token = signer.issue(42, "answer@example.com").unwrap().token;

        assert!(rejected(&guard.check(false, None).await));
        assert!(rejected(&guard.check(false, Some(&token)).await));
        assert!(rejected(
            &guard.check(false, Some(&format!("Token {}", token))).await
        ));
        assert!(rejected(&guard.check(false, Some("Bearer garbage")).await));
    }

    #[actix_rt::test]
    async fn test_valid_token_resolves_identity() {
        let (guard, signer) = guard_for(store_with_user(42, "answer@example.com"));
        let token = signer.issue(42, "answer@example.com").unwrap().token;

        match guard.check(false, Some(&format!("Bearer {}", token))).await {
            Decision::Allowed(Some(user)) => {
                assert_eq!(user.id, 42);
                assert_eq!(user.email, "answer@example.com");
            }
            other => panic!("expected an allowed request, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_token_rejected_after_expiry() {
        let (guard, signer) = guard_for(store_with_user(42, "answer@example.com"));
        let issued = signer.issue(42, "answer@example.com").unwrap();
        let header = format!("Bearer {}", issued.token);

        let at_issue = guard.check_at(false, Some(&header), issued.claims.iat).await;
        assert!(matches!(at_issue, Decision::Allowed(Some(_))));

        let after_expiry = guard
            .check_at(false, Some(&header), issued.claims.exp + 1)
            .await;
        assert!(rejected(&after_expiry));
    }

    #[actix_rt::test]
    async fn test_token_from_other_key_pair_is_rejected() {
        let (guard, _) = guard_for(store_with_user(42, "answer@example.com"));
        let impostor = TokenSigner::new(
            test_keys::OTHER_PRIVATE,
            test_keys::OTHER_PUBLIC,
            Algorithm::RS512,
            Duration::hours(1),
        )
        .unwrap();
        let forged = impostor.issue(42, "answer@example.com").unwrap().token;

        assert!(rejected(
            &guard.check(false, Some(&format!("Bearer {}", forged))).await
        ));
    }

    #[actix_rt::test]
    async fn test_unknown_subject_is_rejected() {
        let store = store_with_user(42, "answer@example.com");
        let (guard, signer) = guard_for(store.clone());
        let token = signer.issue(42, "answer@example.com").unwrap().token;
        let header = format!("Bearer {}", token);

        store.remove(42);
        assert!(rejected(&guard.check(false, Some(&header)).await));
    }

    #[actix_rt::test]
    async fn test_subject_id_must_match_account() {
        let (guard, signer) = guard_for(store_with_user(42, "answer@example.com"));
        let token = signer.issue(99, "answer@example.com").unwrap().token;

        assert!(rejected(
            &guard.check(false, Some(&format!("Bearer {}", token))).await
        ));
    }
}
