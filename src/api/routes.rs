//! Route Wiring
//! Mission: Assemble public, protected, and admin routers into one app

use crate::api::{flashcard_sets, flashcards, users, AppState};
use crate::auth::{api as auth_api, middleware::require_auth, AuthGate, AuthState, TokenService};
use crate::auth::models::UserRole;
use crate::middleware::request_logging;
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Build the full application router.
///
/// Three protection levels: auth endpoints and the health check are public,
/// flashcard routes require a valid token, user management requires the
/// `admin` role. Ownership checks live in the handlers themselves.
pub fn app(app_state: AppState, auth_state: AuthState, tokens: Arc<TokenService>) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth_api::register))
        .route("/auth/login", post(auth_api::login))
        .with_state(auth_state);

    let deck_routes = Router::new()
        .route(
            "/flashcardSets",
            get(flashcard_sets::get_all_sets).post(flashcard_sets::create_set),
        )
        .route(
            "/flashcardSets/:id",
            get(flashcard_sets::get_set_by_id)
                .patch(flashcard_sets::update_set)
                .delete(flashcard_sets::delete_set),
        )
        .route(
            "/flashcards",
            get(flashcards::get_all_cards).post(flashcards::create_card),
        )
        .route("/flashcards/set/:setId", get(flashcards::get_cards_by_set))
        .route(
            "/flashcards/:id",
            get(flashcards::get_card_by_id)
                .patch(flashcards::update_card)
                .delete(flashcards::delete_card),
        )
        .route_layer(middleware::from_fn_with_state(
            AuthGate::new(tokens.clone()),
            require_auth,
        ))
        .with_state(app_state.clone());

    let admin_routes = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user_by_id)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            AuthGate::with_role(tokens, UserRole::Admin),
            require_auth,
        ))
        .with_state(app_state);

    let public_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(deck_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
