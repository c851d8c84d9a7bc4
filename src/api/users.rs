//! User Management Endpoints
//! Mission: Admin-only user administration

use crate::api::{ApiError, AppState};
use crate::auth::models::{UserResponse, UserRole};
use crate::auth::password::hash_password;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid user ID format"))
}

async fn hash_on_blocking_pool(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!("Hashing task failed: {}", e);
            ApiError::InternalError
        })?
        .map_err(ApiError::from)
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.list_users()?;
    Ok(Json(users.iter().map(UserResponse::from_user).collect()))
}

/// GET /users/:id
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_user_id(&id)?;
    let user = state
        .users
        .get_user_by_id(&id)?
        .ok_or(ApiError::UserNotFound)?;
    Ok(Json(UserResponse::from_user(&user)))
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    if payload.username.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(ApiError::Validation("username and email are required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::Validation("password is required"));
    }

    let password_hash = hash_on_blocking_pool(payload.password).await?;
    let role = payload.role.unwrap_or(UserRole::User);

    let user = state
        .users
        .create_user(&payload.username, &payload.email, &password_hash, role)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

/// PATCH /users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_user_id(&id)?;

    let password_hash = match payload.password {
        Some(password) if !password.is_empty() => Some(hash_on_blocking_pool(password).await?),
        _ => None,
    };

    let user = state.users.update_user(
        &id,
        payload.username.as_deref(),
        payload.email.as_deref(),
        password_hash.as_deref(),
    )?;

    Ok(Json(UserResponse::from_user(&user)))
}

/// DELETE /users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_user_id(&id)?;
    state.users.delete_user(&id)?;

    Ok(Json(json!({ "message": "User deleted successfully" })))
}
