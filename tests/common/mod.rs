#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, App};
use chrono::{Duration, Utc};
use jsonwebtoken::Algorithm;
use taskgate::auth::{Bcrypt, TokenSigner};
use taskgate::models::{AccountStatus, CredentialRecord};
use taskgate::routes::{self, Services};
use taskgate::store::MemoryUserStore;

pub const PRIVATE_KEY: &str = include_str!("../fixtures/rsa_private.pem");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/rsa_public.pem");
pub const OTHER_PRIVATE_KEY: &str = include_str!("../fixtures/other_rsa_private.pem");
pub const OTHER_PUBLIC_KEY: &str = include_str!("../fixtures/other_rsa_public.pem");

/// bcrypt's minimum cost keeps the suite fast.
pub const TEST_COST: u32 = 4;

pub fn signer() -> TokenSigner {
    TokenSigner::new(PRIVATE_KEY, PUBLIC_KEY, Algorithm::RS512, Duration::hours(1))
        .expect("fixture keys must build a signer")
}

pub fn other_signer() -> TokenSigner {
    TokenSigner::new(
        OTHER_PRIVATE_KEY,
        OTHER_PUBLIC_KEY,
        Algorithm::RS512,
        Duration::hours(1),
    )
    .expect("fixture keys must build a signer")
}

/// An in-memory account store plus the services wired around it.
pub struct TestContext {
    pub store: Arc<MemoryUserStore>,
    pub signer: Arc<TokenSigner>,
    pub services: Services,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryUserStore::new());
        let signer = Arc::new(signer());
        let services = Services::new(store.clone(), signer.clone(), Bcrypt::new(TEST_COST));
        Self {
            store,
            signer,
            services,
        }
    }

    /// Stores an account whose password hashes to `password`.
    pub fn seed_user(&self, id: i32, email: &str, password: &str, status: AccountStatus) {
        let password_hash = Bcrypt::new(TEST_COST)
            .hash(password)
            .expect("hashing a fixture password");
        self.store.put(CredentialRecord {
            id,
            name: format!("user{}", id),
            email: email.to_string(),
            password_hash,
            status,
            created_at: Utc::now(),
        });
    }

    pub fn bearer_for(&self, id: i32, email: &str) -> String {
        let token = self.signer.issue(id, email).expect("issuing a fixture token");
        format!("Bearer {}", token.token)
    }
}

pub async fn init_app(
    services: Services,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(App::new().configure(move |cfg| routes::config(cfg, &services))).await
}
