use crate::{auth::AuthenticatedUser, error::AppError, store::UserStore};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

/// Returns the identity the request guard resolved for this request.
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(json!({ "user": user }))
}

/// Looks up an account by id.
///
/// ## Responses:
/// - `200 OK`: `{ "user": { "id", "email" } }`.
/// - `404 Not Found`: no account has this id.
pub async fn get_user(
    users: web::Data<dyn UserStore>,
    user_id: web::Path<i32>,
    _caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let record = users
        .find_by_id(user_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "user": { "id": record.id, "email": record.email }
    })))
}
