//! Flashcard Endpoints
//! Mission: CRUD for cards; ownership is transitive through the parent set

use crate::api::{ensure_owner, ApiError, AppState};
use crate::auth::models::AuthContext;
use crate::store::Flashcard;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub set_id: String,
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCardRequest {
    pub term: Option<String>,
    pub definition: Option<String>,
}

fn parse_card_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid flashcard ID format"))
}

/// The owning user of a card is the owner of its parent set.
fn card_owner(state: &AppState, card: &Flashcard) -> Result<Uuid, ApiError> {
    let set = state
        .decks
        .get_set(&card.set_id)?
        .ok_or(ApiError::SetNotFound)?;
    Ok(set.user_id)
}

/// GET /flashcards
pub async fn get_all_cards(
    State(state): State<AppState>,
) -> Result<Json<Vec<Flashcard>>, ApiError> {
    Ok(Json(state.decks.list_cards()?))
}

/// GET /flashcards/set/:setId
pub async fn get_cards_by_set(
    State(state): State<AppState>,
    Path(set_id): Path<String>,
) -> Result<Json<Vec<Flashcard>>, ApiError> {
    let set_id = Uuid::parse_str(&set_id)
        .map_err(|_| ApiError::Validation("Invalid flashcard set ID format"))?;

    let cards = state.decks.cards_by_set(&set_id)?;
    if cards.is_empty() {
        return Err(ApiError::NoCardsInSet);
    }

    Ok(Json(cards))
}

/// GET /flashcards/:id
pub async fn get_card_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Flashcard>, ApiError> {
    let id = parse_card_id(&id)?;
    let card = state.decks.get_card(&id)?.ok_or(ApiError::CardNotFound)?;
    Ok(Json(card))
}

/// POST /flashcards
pub async fn create_card(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<Flashcard>), ApiError> {
    if payload.term.trim().is_empty() || payload.definition.trim().is_empty() {
        return Err(ApiError::Validation("term and definition are required"));
    }

    let set_id = Uuid::parse_str(&payload.set_id)
        .map_err(|_| ApiError::Validation("Invalid flashcard set ID format"))?;

    // Parent set must exist and belong to the caller
    let set = state.decks.get_set(&set_id)?.ok_or(ApiError::SetNotFound)?;
    ensure_owner(set.user_id, &ctx)?;

    let card = state
        .decks
        .create_card(&set_id, &payload.term, &payload.definition)?;

    Ok((StatusCode::CREATED, Json(card)))
}

/// PATCH /flashcards/:id
pub async fn update_card(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCardRequest>,
) -> Result<Json<Flashcard>, ApiError> {
    let id = parse_card_id(&id)?;

    let card = state.decks.get_card(&id)?.ok_or(ApiError::CardNotFound)?;
    ensure_owner(card_owner(&state, &card)?, &ctx)?;

    let updated = state
        .decks
        .update_card(&id, payload.term.as_deref(), payload.definition.as_deref())?;

    Ok(Json(updated))
}

/// DELETE /flashcards/:id
pub async fn delete_card(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_card_id(&id)?;

    let card = state.decks.get_card(&id)?.ok_or(ApiError::CardNotFound)?;
    ensure_owner(card_owner(&state, &card)?, &ctx)?;

    state.decks.delete_card(&id)?;

    Ok(Json(json!({ "message": "Flashcard deleted successfully" })))
}
