use crate::{
    auth::{AuthResponse, Authority, Bcrypt, LoginRequest, RegisterRequest},
    error::AppError,
    models::{NewUser, User},
    store::UserStore,
};
use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Creates an active account. Does not log the user in.
///
/// ## Responses:
/// - `201 Created`: `{ "user": { "id", "email" } }`.
/// - `409 Conflict`: the email is already registered.
/// - `422 Unprocessable Entity`: input validation failed.
pub async fn register(
    users: web::Data<dyn UserStore>,
    hasher: web::Data<Bcrypt>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let register_data = register_data.into_inner();

    let hasher = *hasher.get_ref();
    let password = register_data.password.clone();
    let password_hash = web::block(move || hasher.hash(&password))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))??;

    let record = users
        .insert(NewUser {
            name: register_data.name,
            email: register_data.email,
            password_hash,
        })
        .await?;

    info!("registered user {}", record.id);
    let user = User::from(&record);
    Ok(HttpResponse::Created().json(json!({
        "user": { "id": user.id, "email": user.email }
    })))
}

/// Login user
///
/// Exchanges an email and password for an access token.
///
/// ## Responses:
/// - `200 OK`: an `AuthResponse` with the token and its expiry.
/// - `401 Unauthorized`: wrong password, or the account is inactive.
/// - `404 Not Found`: no account has this email.
/// - `422 Unprocessable Entity`: input validation failed.
pub async fn login(
    authority: web::Data<Authority>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let token = authority
        .authenticate(&login_data.email, &login_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(AuthResponse::from(token)))
}
