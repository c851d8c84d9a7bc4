//! Authentication API Endpoints
//! Mission: Provide registration and login endpoints

use crate::auth::models::{LoginRequest, RegisterRequest, UserResponse};
use crate::auth::service::{AuthError, AuthService};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub service: Arc<AuthService>,
}

impl AuthState {
    pub fn new(service: Arc<AuthService>) -> Self {
        Self { service }
    }
}

/// Register endpoint - POST /auth/register
pub async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, AuthApiError> {
    let user = state.service.register(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "user": UserResponse::from_user(&user) })),
    )
        .into_response())
}

/// Login endpoint - POST /auth/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AuthApiError> {
    let token = state.service.login(&payload.email, &payload.password).await?;

    Ok(Json(json!({ "success": true, "token": token })).into_response())
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    DuplicateUser,
    InvalidCredentials,
    Validation(&'static str),
    InternalError,
}

impl From<AuthError> for AuthApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::DuplicateUser => AuthApiError::DuplicateUser,
            AuthError::InvalidCredentials => AuthApiError::InvalidCredentials,
            AuthError::Validation(msg) => AuthApiError::Validation(msg),
            AuthError::Internal(err) => {
                // Log the real cause but never echo it to clients
                error!("Auth internal error: {:#}", err);
                AuthApiError::InternalError
            }
        }
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AuthApiError::DuplicateUser => (
                StatusCode::BAD_REQUEST,
                "User with this email already exists",
            ),
            AuthApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid email or password")
            }
            AuthApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "success": false, "error": error }))).into_response()
    }
}
