use actix_web::{HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Liveness probe. Exempt from the request guard.
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now()
    }))
}
