//! Authorization Middleware
//! Mission: Gate protected routes behind bearer-token verification

use crate::auth::jwt::TokenService;
use crate::auth::models::{AuthContext, UserRole};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Request gate with an optional required role.
///
/// One gate instance per protection level: `AuthGate::new` only requires a
/// valid token, `AuthGate::with_role` additionally requires an exact role
/// match.
#[derive(Clone)]
pub struct AuthGate {
    tokens: Arc<TokenService>,
    required_role: Option<UserRole>,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self {
            tokens,
            required_role: None,
        }
    }

    pub fn with_role(tokens: Arc<TokenService>, role: UserRole) -> Self {
        Self {
            tokens,
            required_role: Some(role),
        }
    }
}

/// Middleware that validates the `Authorization: Bearer <token>` header.
///
/// Runs to completion before any handler logic: extract token, verify
/// signature and expiry, enforce the required role, then attach the decoded
/// identity to the request extensions.
pub async fn require_auth(
    State(gate): State<AuthGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthGateError> {
    // Token is the second segment of the header, `Bearer <token>`
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split_whitespace().nth(1))
        .ok_or(AuthGateError::MissingToken)?;

    let claims = gate.tokens.verify(token).map_err(|e| {
        debug!("Token rejected: {}", e);
        AuthGateError::InvalidToken
    })?;

    if let Some(required) = gate.required_role {
        if claims.role != required {
            return Err(AuthGateError::InsufficientRole);
        }
    }

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
        debug!("Token rejected: subject is not a valid user id");
        AuthGateError::InvalidToken
    })?;

    req.extensions_mut().insert(AuthContext {
        user_id,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Auth gate error types
#[derive(Debug, PartialEq, Eq)]
pub enum AuthGateError {
    MissingToken,
    InvalidToken,
    InsufficientRole,
}

impl IntoResponse for AuthGateError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthGateError::MissingToken => (StatusCode::UNAUTHORIZED, "No token provided"),
            AuthGateError::InvalidToken => (StatusCode::FORBIDDEN, "Invalid token"),
            AuthGateError::InsufficientRole => (
                StatusCode::FORBIDDEN,
                "Access denied: insufficient permissions",
            ),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
