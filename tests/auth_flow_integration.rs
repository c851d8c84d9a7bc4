//! Integration tests for the HTTP surface.
//!
//! Drives the assembled router end to end: registration, login, the bearer
//! token gate, role enforcement, and the ownership policy on flashcard sets
//! and flashcards.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use flashdeck_backend::api::{routes, AppState};
use flashdeck_backend::auth::models::{Claims, UserRole};
use flashdeck_backend::auth::{AuthService, AuthState, TokenService, UserStore};
use flashdeck_backend::store::DeckStore;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

const TEST_SECRET: &str = "integration-test-secret";

struct TestApp {
    app: Router,
    _tmp: TempDir,
}

fn test_app() -> TestApp {
    let tmp = TempDir::new().unwrap();
    let auth_db = tmp.path().join("auth.db");
    let deck_db = tmp.path().join("decks.db");

    let users = Arc::new(UserStore::new(auth_db.to_str().unwrap()).unwrap());
    let decks = Arc::new(DeckStore::new(deck_db.to_str().unwrap()).unwrap());
    let tokens = Arc::new(TokenService::new(TEST_SECRET.to_string()));
    let service = Arc::new(AuthService::new(users.clone(), tokens.clone()));

    let app = routes::app(AppState { decks, users }, AuthState::new(service), tokens);

    TestApp { app, _tmp: tmp }
}

async fn send(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

async fn register(app: &Router, username: &str, email: &str, role: Option<&str>) -> Value {
    let mut body = json!({
        "username": username,
        "email": email,
        "password": "hunter22",
    });
    if let Some(role) = role {
        body["role"] = json!(role);
    }

    let (status, value) = send(app, Method::POST, "/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    value
}

async fn login(app: &Router, email: &str) -> String {
    let body = json!({ "email": email, "password": "hunter22" });
    let (status, value) = send(app, Method::POST, "/auth/login", None, Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    value["token"].as_str().unwrap().to_string()
}

async fn create_set(app: &Router, token: &str, title: &str) -> Value {
    let body = json!({ "title": title, "description": "test deck" });
    let (status, value) = send(app, Method::POST, "/flashcardSets", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    value
}

#[tokio::test]
async fn test_register_then_login() {
    let harness = test_app();

    let registered = register(&harness.app, "alice", "alice@example.com", None).await;
    assert_eq!(registered["success"], json!(true));
    assert_eq!(registered["user"]["username"], json!("alice"));
    assert_eq!(registered["user"]["role"], json!("user"));
    // The password hash never leaves the server
    assert!(registered["user"].get("password_hash").is_none());
    assert!(registered["user"].get("passwordHash").is_none());

    let token = login(&harness.app, "alice@example.com").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let harness = test_app();

    register(&harness.app, "alice", "alice@example.com", None).await;

    let body = json!({
        "username": "alice2",
        "email": "alice@example.com",
        "password": "other-password",
    });
    let (status, value) = send(&harness.app, Method::POST, "/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["success"], json!(false));
    assert_eq!(value["error"], json!("User with this email already exists"));

    // First account still works
    login(&harness.app, "alice@example.com").await;
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let harness = test_app();

    register(&harness.app, "alice", "alice@example.com", None).await;

    let wrong_password = json!({ "email": "alice@example.com", "password": "nope" });
    let (status_a, body_a) =
        send(&harness.app, Method::POST, "/auth/login", None, Some(wrong_password)).await;

    let unknown_email = json!({ "email": "ghost@example.com", "password": "hunter22" });
    let (status_b, body_b) =
        send(&harness.app, Method::POST, "/auth/login", None, Some(unknown_email)).await;

    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_b, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a, body_b);
}

#[tokio::test]
async fn test_missing_token_is_401_and_garbage_is_403() {
    let harness = test_app();

    let (status, body) = send(&harness.app, Method::GET, "/flashcardSets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("No token provided"));

    let (status, body) =
        send(&harness.app, Method::GET, "/flashcardSets", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], json!("Invalid token"));
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let harness = test_app();

    // Same secret, expiry an hour in the past
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        role: UserRole::User,
        iat: now - 7200,
        exp: now - 3600,
    };
    let stale = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let (status, body) =
        send(&harness.app, Method::GET, "/flashcardSets", Some(&stale), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], json!("Invalid token"));
}

#[tokio::test]
async fn test_set_ownership_policy() {
    let harness = test_app();

    register(&harness.app, "alice", "alice@example.com", None).await;
    register(&harness.app, "bob", "bob@example.com", None).await;
    let alice = login(&harness.app, "alice@example.com").await;
    let bob = login(&harness.app, "bob@example.com").await;

    let set = create_set(&harness.app, &alice, "Alice's deck").await;
    let set_id = set["id"].as_str().unwrap().to_string();
    let set_path = format!("/flashcardSets/{}", set_id);

    // Bob cannot update or delete Alice's set
    let (status, body) = send(
        &harness.app,
        Method::PATCH,
        &set_path,
        Some(&bob),
        Some(json!({ "title": "Bob's now" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], json!("Access denied: not your resource"));

    let (status, _) = send(&harness.app, Method::DELETE, &set_path, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Set unchanged
    let (status, unchanged) = send(&harness.app, Method::GET, &set_path, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged["title"], json!("Alice's deck"));

    // Alice updates her own set; updated_at moves forward
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let (status, updated) = send(
        &harness.app,
        Method::PATCH,
        &set_path,
        Some(&alice),
        Some(json!({ "title": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], json!("Renamed"));
    assert!(updated["updated_at"].as_str().unwrap() > set["updated_at"].as_str().unwrap());

    // Missing resource is 404, reported before any ownership comparison
    let ghost = format!("/flashcardSets/{}", Uuid::new_v4());
    let (status, body) = send(
        &harness.app,
        Method::PATCH,
        &ghost,
        Some(&bob),
        Some(json!({ "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Flashcard set not found"));
}

#[tokio::test]
async fn test_flashcard_ownership_is_transitive() {
    let harness = test_app();

    register(&harness.app, "alice", "alice@example.com", None).await;
    register(&harness.app, "bob", "bob@example.com", None).await;
    let alice = login(&harness.app, "alice@example.com").await;
    let bob = login(&harness.app, "bob@example.com").await;

    let set = create_set(&harness.app, &alice, "Vocab").await;
    let set_id = set["id"].as_str().unwrap().to_string();

    // Bob cannot add a card to Alice's set
    let card_body = json!({ "setId": set_id, "term": "hola", "definition": "hello" });
    let (status, _) = send(
        &harness.app,
        Method::POST,
        "/flashcards",
        Some(&bob),
        Some(card_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Alice can
    let (status, card) = send(
        &harness.app,
        Method::POST,
        "/flashcards",
        Some(&alice),
        Some(card_body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let card_path = format!("/flashcards/{}", card["id"].as_str().unwrap());

    // Bob cannot mutate the card through the parent set he doesn't own
    let (status, _) = send(
        &harness.app,
        Method::PATCH,
        &card_path,
        Some(&bob),
        Some(json!({ "definition": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&harness.app, Method::DELETE, &card_path, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Cards listed by set; an unknown set yields 404
    let (status, cards) = send(
        &harness.app,
        Method::GET,
        &format!("/flashcards/set/{}", set_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cards.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &harness.app,
        Method::GET,
        &format!("/flashcards/set/{}", Uuid::new_v4()),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("No flashcards found for this set"));
}

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let harness = test_app();

    register(&harness.app, "alice", "alice@example.com", None).await;
    register(&harness.app, "root", "root@example.com", Some("admin")).await;
    let alice = login(&harness.app, "alice@example.com").await;
    let admin = login(&harness.app, "root@example.com").await;

    // Valid token, wrong role
    let (status, body) = send(&harness.app, Method::GET, "/users", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        json!("Access denied: insufficient permissions")
    );

    // Admin sees the user list, sanitized
    let (status, users) = send(&harness.app, Method::GET, "/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().unwrap().clone();
    assert_eq!(users.len(), 2);
    for user in &users {
        assert!(user.get("password_hash").is_none());
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let harness = test_app();

    let (status, body) = send(&harness.app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}
