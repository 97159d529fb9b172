#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "Credential checking, RSA-signed access tokens, the per-endpoint request guard,"]
#![doc = "account and task handlers, and the route table that ties them together."]
#![doc = "The binary (`main.rs`) loads configuration, connects to PostgreSQL and serves"]
#![doc = "the routes declared here."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
pub use crate::routes::Services;
