use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Represents the claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: i32,
    /// The user's login identifier, used to resolve the subject on each request.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// A freshly minted access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The encoded JWT.
    pub token: String,
    pub claims: Claims,
}

impl AccessToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.claims.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// Signs and verifies access tokens with an RSA key pair.
///
/// The private key signs and the public key verifies. Construction parses
/// both keys and round-trips a probe token, so bad or mismatched key material
/// is reported at startup instead of on the first login.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    duration: Duration,
}

impl TokenSigner {
    pub fn new(
        private_key_pem: &str,
        public_key_pem: &str,
        algorithm: Algorithm,
        duration: Duration,
    ) -> Result<Self, AuthError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| AuthError::SigningError(format!("private key: {}", e)))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| AuthError::SigningError(format!("public key: {}", e)))?;

        // Expiry is checked by `verify_at` against an explicit clock.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let signer = Self {
            encoding_key,
            decoding_key,
            algorithm,
            validation,
            duration,
        };

        let now = Utc::now().timestamp();
        let probe = signer.issue_at(0, "probe@localhost", now)?;
        signer
            .verify_at(&probe.token, now)
            .map_err(|_| AuthError::SigningError("private and public keys do not match".into()))?;

        Ok(signer)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Mints a token for `subject_id` expiring one configured duration from now.
    pub fn issue(&self, subject_id: i32, email: &str) -> Result<AccessToken, AuthError> {
        self.issue_at(subject_id, email, Utc::now().timestamp())
    }

    pub fn issue_at(
        &self,
        subject_id: i32,
        email: &str,
        now: i64,
    ) -> Result<AccessToken, AuthError> {
        let claims = Claims {
            sub: subject_id,
            email: email.to_string(),
            iat: now,
            exp: now + self.duration.num_seconds(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::SigningError(e.to_string()))?;

        Ok(AccessToken { token, claims })
    }

    /// Checks signature and expiry against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// A token is valid up to and including its `exp` second.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::Unauthenticated(format!("Invalid token: {:?}", e.kind())))?;

        if now > claims.exp {
            return Err(AuthError::Unauthenticated(
                "Invalid token: ExpiredSignature".into(),
            ));
        }
        Ok(claims)
    }
}


#[cfg(test)]
pub(crate) fn test_signer() -> TokenSigner {
    TokenSigner::new(
        test_keys::PRIVATE,
        test_keys::PUBLIC,
        Algorithm::RS512,
        Duration::hours(1),
    )
    .unwrap()
}
