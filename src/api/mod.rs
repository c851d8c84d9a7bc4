//! Resource API
//! Mission: CRUD endpoints for flashcard sets, flashcards, and users

pub mod flashcard_sets;
pub mod flashcards;
pub mod routes;
pub mod users;

use crate::auth::models::AuthContext;
use crate::auth::user_store::{StoreError, UserStore};
use crate::store::DeckStore;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Application state shared across resource handlers
#[derive(Clone)]
pub struct AppState {
    pub decks: Arc<DeckStore>,
    pub users: Arc<UserStore>,
}

/// Resource API errors
#[derive(Debug)]
pub enum ApiError {
    SetNotFound,
    CardNotFound,
    NoCardsInSet,
    UserNotFound,
    NotYourResource,
    DuplicateUser,
    Validation(&'static str),
    InternalError,
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        error!("Store error: {:#}", e);
        ApiError::InternalError
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateUser => ApiError::DuplicateUser,
            StoreError::UserNotFound => ApiError::UserNotFound,
            StoreError::Database(err) => {
                error!("User store error: {}", err);
                ApiError::InternalError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::SetNotFound => (StatusCode::NOT_FOUND, "Flashcard set not found"),
            ApiError::CardNotFound => (StatusCode::NOT_FOUND, "Flashcard not found"),
            ApiError::NoCardsInSet => (StatusCode::NOT_FOUND, "No flashcards found for this set"),
            ApiError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            ApiError::NotYourResource => {
                (StatusCode::FORBIDDEN, "Access denied: not your resource")
            }
            ApiError::DuplicateUser => (
                StatusCode::BAD_REQUEST,
                "User with this email already exists",
            ),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Ownership check: a mutating handler calls this after confirming the
/// resource exists and before applying the mutation. No admin bypass.
pub fn ensure_owner(owner_id: Uuid, ctx: &AuthContext) -> Result<(), ApiError> {
    if owner_id != ctx.user_id {
        return Err(ApiError::NotYourResource);
    }
    Ok(())
}
