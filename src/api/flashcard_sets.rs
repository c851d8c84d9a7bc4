//! Flashcard Set Endpoints
//! Mission: CRUD for decks, with the ownership policy on every mutation

use crate::api::{ensure_owner, ApiError, AppState};
use crate::auth::models::AuthContext;
use crate::store::FlashcardSet;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateSetRequest {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSetRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

fn parse_set_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid flashcard set ID format"))
}

/// GET /flashcardSets
pub async fn get_all_sets(
    State(state): State<AppState>,
) -> Result<Json<Vec<FlashcardSet>>, ApiError> {
    Ok(Json(state.decks.list_sets()?))
}

/// GET /flashcardSets/:id
pub async fn get_set_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FlashcardSet>, ApiError> {
    let id = parse_set_id(&id)?;
    let set = state.decks.get_set(&id)?.ok_or(ApiError::SetNotFound)?;
    Ok(Json(set))
}

/// POST /flashcardSets
///
/// The owner is the authenticated identity from the verified token, never a
/// client-supplied field.
pub async fn create_set(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<CreateSetRequest>,
) -> Result<(StatusCode, Json<FlashcardSet>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("title is required"));
    }

    let set = state
        .decks
        .create_set(&ctx.user_id, &payload.title, payload.description.as_deref())?;

    Ok((StatusCode::CREATED, Json(set)))
}

/// PATCH /flashcardSets/:id
pub async fn update_set(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateSetRequest>,
) -> Result<Json<FlashcardSet>, ApiError> {
    let id = parse_set_id(&id)?;

    // Existence before ownership, ownership before mutation
    let set = state.decks.get_set(&id)?.ok_or(ApiError::SetNotFound)?;
    ensure_owner(set.user_id, &ctx)?;

    let updated = state.decks.update_set(
        &id,
        payload.title.as_deref(),
        payload.description.as_deref(),
    )?;

    Ok(Json(updated))
}

/// DELETE /flashcardSets/:id
pub async fn delete_set(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_set_id(&id)?;

    let set = state.decks.get_set(&id)?.ok_or(ApiError::SetNotFound)?;
    ensure_owner(set.user_id, &ctx)?;

    state.decks.delete_set(&id)?;

    Ok(Json(json!({ "message": "Flashcard set deleted successfully" })))
}
