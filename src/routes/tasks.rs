use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Task, TaskInput},
};
use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

const TASK_COLUMNS: &str = "id, name, created_at, updated_at";

/// Task names are unique, so a unique violation is a client conflict.
fn task_conflict(error: sqlx::Error) -> AppError {
    match error {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::Conflict("Task already exists".into())
        }
        other => AppError::from(other),
    }
}

/// Lists every task, oldest first.
///
/// ## Responses:
/// - `200 OK`: `{ "tasks": [Task, ...] }`.
/// - `401 Unauthorized`: the request lacks a valid access token.
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let sql = format!("SELECT {} FROM tasks ORDER BY id", TASK_COLUMNS);
    let tasks = sqlx::query_as::<_, Task>(&sql)
        .fetch_all(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "tasks": tasks })))
}

/// Creates a new task.
///
/// ## Request Body:
/// `{ "name": "..." }`, 1 to 255 characters.
///
/// ## Responses:
/// - `201 Created`: `{ "message": "Task created successfully." }`.
/// - `401 Unauthorized`: the request lacks a valid access token.
/// - `409 Conflict`: a task with this name already exists.
/// - `422 Unprocessable Entity`: the name failed validation.
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let sql = format!(
        "INSERT INTO tasks (name) VALUES ($1) RETURNING {}",
        TASK_COLUMNS
    );
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(&task_data.name)
        .fetch_one(&**pool)
        .await
        .map_err(task_conflict)?;

    info!("user {} created task {}", user.id, task.id);
    Ok(HttpResponse::Created().json(json!({ "message": "Task created successfully." })))
}

/// Retrieves a specific task by its id.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `401 Unauthorized`: the request lacks a valid access token.
/// - `404 Not Found`: no task has this id.
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(task_id.into_inner())
        .fetch_optional(&**pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Renames a task.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `401 Unauthorized`: the request lacks a valid access token.
/// - `404 Not Found`: no task has this id.
/// - `409 Conflict`: another task already has this name.
/// - `422 Unprocessable Entity`: the name failed validation.
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskInput>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let sql = format!(
        "UPDATE tasks SET name = $1, updated_at = now() WHERE id = $2 RETURNING {}",
        TASK_COLUMNS
    );
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(&task_data.name)
        .bind(task_id.into_inner())
        .fetch_optional(&**pool)
        .await
        .map_err(task_conflict)?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its id.
///
/// ## Responses:
/// - `204 No Content`: the task was deleted.
/// - `401 Unauthorized`: the request lacks a valid access token.
/// - `404 Not Found`: no task has this id.
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(task_id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    info!("user {} deleted task {}", user.id, task_id);
    Ok(HttpResponse::NoContent().finish())
}
