//! Auth Service
//! Mission: Orchestrate registration and login over the user store

use crate::auth::jwt::TokenService;
use crate::auth::models::{RegisterRequest, User, UserRole};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::user_store::{StoreError, UserStore};
use anyhow::anyhow;
use std::sync::Arc;
use tracing::{info, warn};

/// Auth service errors
#[derive(Debug)]
pub enum AuthError {
    DuplicateUser,
    /// Identical for unknown email and wrong password, so a caller cannot
    /// probe which emails are registered.
    InvalidCredentials,
    Validation(&'static str),
    Internal(anyhow::Error),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::DuplicateUser => write!(f, "User with this email already exists"),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::Validation(msg) => write!(f, "{}", msg),
            AuthError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateUser => AuthError::DuplicateUser,
            other => AuthError::Internal(anyhow!(other)),
        }
    }
}

/// Registration and login orchestration: uniqueness check + hash + store,
/// lookup + verify + token issuance.
pub struct AuthService {
    users: Arc<UserStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Register a new user. Role defaults to `user` when unspecified.
    ///
    /// The email lookup is a fast-path only; the store's UNIQUE constraint is
    /// the authoritative duplicate check, closing the check-then-create race.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AuthError> {
        if req.username.trim().is_empty() || req.email.trim().is_empty() {
            return Err(AuthError::Validation("username and email are required"));
        }
        if req.password.is_empty() {
            return Err(AuthError::Validation("password is required"));
        }

        if self.users.get_user_by_email(&req.email)?.is_some() {
            return Err(AuthError::DuplicateUser);
        }

        let password = req.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Internal(anyhow!(e)))?
            .map_err(AuthError::Internal)?;

        let role = req.role.unwrap_or(UserRole::User);
        let user = self
            .users
            .create_user(&req.username, &req.email, &password_hash, role)?;

        info!("🔐 Registered user: {} ({})", user.username, user.role.as_str());

        Ok(user)
    }

    /// Verify credentials and issue a token scoped to the user's id and role.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let Some(user) = self.users.get_user_by_email(email)? else {
            warn!("❌ Failed login attempt: {}", email);
            return Err(AuthError::InvalidCredentials);
        };

        let digest = user.password_hash.clone();
        let password = password.to_string();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &digest))
            .await
            .map_err(|e| AuthError::Internal(anyhow!(e)))?;

        if !valid {
            warn!("❌ Failed login attempt: {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(user.id, user.role)
            .map_err(AuthError::Internal)?;

        info!("✅ Login successful: {} ({})", user.username, user.role.as_str());

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_service() -> (AuthService, Arc<TokenService>, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let users = Arc::new(UserStore::new(temp_file.path().to_str().unwrap()).unwrap());
        let tokens = Arc::new(TokenService::new("test-secret-key-12345".to_string()));
        let service = AuthService::new(users, tokens.clone());
        (service, tokens, temp_file)
    }

    fn register_request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_register_defaults_to_user_role() {
        let (service, _, _temp) = create_test_service();

        let user = service
            .register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(user.role, UserRole::User);
        assert_ne!(user.password_hash, "hunter22"); // stored hashed
    }

    #[tokio::test]
    async fn test_register_duplicate_email_fails() {
        let (service, _, _temp) = create_test_service();

        service
            .register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();

        let second = service
            .register(register_request("alice2", "alice@example.com"))
            .await;
        assert!(matches!(second, Err(AuthError::DuplicateUser)));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_fields() {
        let (service, _, _temp) = create_test_service();

        let result = service
            .register(RegisterRequest {
                username: "".to_string(),
                email: "a@example.com".to_string(),
                password: "pw".to_string(),
                role: None,
            })
            .await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let (service, tokens, _temp) = create_test_service();

        let user = service
            .register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();

        let token = service.login("alice@example.com", "hunter22").await.unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_login_failure_is_indistinguishable() {
        let (service, _, _temp) = create_test_service();

        service
            .register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();

        let wrong_password = service.login("alice@example.com", "nope").await;
        let unknown_email = service.login("ghost@example.com", "hunter22").await;

        let msg_a = wrong_password.unwrap_err().to_string();
        let msg_b = unknown_email.unwrap_err().to_string();
        assert_eq!(msg_a, msg_b);
        assert_eq!(msg_a, "Invalid email or password");
    }
}
