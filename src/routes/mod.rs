//! Route table and service wiring.
//!
//! Every endpoint is declared once in [`endpoints`], together with whether it
//! is exempt from authentication. [`config`] registers each entry as its own
//! resource wrapped in [`RequireAuth`] with that flag.

pub mod auth;
pub mod health;
pub mod tasks;
pub mod user;

use std::sync::Arc;

use actix_web::{guard as route_guard, http::Method, web, Route};
use log::debug;

use crate::auth::{Authority, Bcrypt, Guard, PasswordVerifier, RequireAuth, TokenSigner};
use crate::error::AppError;
use crate::store::UserStore;

/// One row of the route table.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub method: Method,
    pub path: &'static str,
    /// Skip the request guard for this endpoint.
    pub exempt: bool,
    pub route: fn() -> Route,
}

/// All endpoints served by the application, in matching order.
pub fn endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint {
            method: Method::GET,
            path: "/health",
            exempt: true,
            route: || web::to(health::health),
        },
        Endpoint {
            method: Method::POST,
            path: "/api/auth/login",
            exempt: true,
            route: || web::to(auth::login),
        },
        Endpoint {
            method: Method::POST,
            path: "/api/auth/register",
            exempt: true,
            route: || web::to(auth::register),
        },
        // Before `/api/user/{id}` so "me" is not parsed as an id.
        Endpoint {
            method: Method::GET,
            path: "/api/user/me",
            exempt: false,
            route: || web::to(user::me),
        },
        Endpoint {
            method: Method::GET,
            path: "/api/user/{id}",
            exempt: false,
            route: || web::to(user::get_user),
        },
        Endpoint {
            method: Method::GET,
            path: "/api/task",
            exempt: false,
            route: || web::to(tasks::get_tasks),
        },
        Endpoint {
            method: Method::POST,
            path: "/api/task",
            exempt: false,
            route: || web::to(tasks::create_task),
        },
        Endpoint {
            method: Method::GET,
            path: "/api/task/{id}",
            exempt: false,
            route: || web::to(tasks::get_task),
        },
        Endpoint {
            method: Method::PUT,
            path: "/api/task/{id}",
            exempt: false,
            route: || web::to(tasks::update_task),
        },
        Endpoint {
            method: Method::DELETE,
            path: "/api/task/{id}",
            exempt: false,
            route: || web::to(tasks::delete_task),
        },
    ]
}

/// The shared, read-only collaborators handlers and the guard depend on.
#[derive(Clone)]
pub struct Services {
    pub users: Arc<dyn UserStore>,
    pub authority: Arc<Authority>,
    pub guard: Arc<Guard>,
    pub hasher: Bcrypt,
}

impl Services {
    /// Wires the authority and guard around one user store and token signer,
    /// verifying passwords with `hasher`.
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenSigner>, hasher: Bcrypt) -> Self {
        Self::with_verifier(users, tokens, hasher, Arc::new(hasher))
    }

    pub fn with_verifier(
        users: Arc<dyn UserStore>,
        tokens: Arc<TokenSigner>,
        hasher: Bcrypt,
        verifier: Arc<dyn PasswordVerifier>,
    ) -> Self {
        let authority = Authority::new(users.clone(), tokens.clone(), verifier);
        let guard = Guard::new(tokens, users.clone());
        Self {
            users,
            authority: Arc::new(authority),
            guard: Arc::new(guard),
            hasher,
        }
    }
}

/// Body and path extraction failures use the same `{ "message" }` shape as
/// every other error. The parser's detail is only logged.
fn extractor_configs() -> (web::JsonConfig, web::PathConfig) {
    let json = web::JsonConfig::default().error_handler(|err, req| {
        debug!("{} {}: rejected body: {}", req.method(), req.path(), err);
        AppError::BadRequest("Invalid request body".into()).into()
    });
    let path = web::PathConfig::default().error_handler(|err, req| {
        debug!("{} {}: unmatched path parameter: {}", req.method(), req.path(), err);
        AppError::NotFound("Not found".into()).into()
    });
    (json, path)
}

pub fn config(cfg: &mut web::ServiceConfig, services: &Services) {
    let (json, path) = extractor_configs();
    cfg.app_data(json)
        .app_data(path)
        .app_data(web::Data::from(services.users.clone()))
        .app_data(web::Data::from(services.authority.clone()))
        .app_data(web::Data::new(services.hasher));

    for endpoint in endpoints() {
        cfg.service(
            web::resource(endpoint.path)
                .guard(route_guard::Method(endpoint.method))
                .route((endpoint.route)())
                .wrap(RequireAuth::new(services.guard.clone(), endpoint.exempt)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_only_entry_points_are_exempt() {
        let exempt: HashSet<&str> = endpoints()
            .iter()
            .filter(|e| e.exempt)
            .map(|e| e.path)
            .collect();
        let expected: HashSet<&str> = ["/health", "/api/auth/login", "/api/auth/register"]
            .into_iter()
            .collect();
        assert_eq!(exempt, expected);
    }

    #[test]
    fn test_routes_are_unique() {
        let table = endpoints();
        let unique: HashSet<(Method, &str)> = table
            .iter()
            .map(|e| (e.method.clone(), e.path))
            .collect();
        assert_eq!(unique.len(), table.len());
    }
}
