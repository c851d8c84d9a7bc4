//! JWT Token Service
//! Mission: Issue and verify signed, time-limited bearer tokens

use crate::auth::models::{Claims, UserRole};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

/// Token lifetime. Validity is signature + expiry only; there is no
/// server-side session store and no revocation.
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Why verification rejected a token. Callers collapse all three into one
/// outward "invalid token" response; the kind is kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Malformed,
    InvalidSignature,
    Expired,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "malformed token"),
            TokenError::InvalidSignature => write!(f, "invalid signature"),
            TokenError::Expired => write!(f, "expired token"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Stateless HS256 token service. The secret is an explicit constructor
/// dependency so tests can run with distinct secrets.
pub struct TokenService {
    secret: String,
}

impl TokenService {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Issue a signed token carrying the user's id and role.
    pub fn issue(&self, user_id: Uuid, role: UserRole) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::seconds(TOKEN_LIFETIME_SECS))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp() as usize,
            exp: expiration,
        };

        debug!("Issuing JWT for user {} ({})", user_id, role.as_str());

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign JWT")
    }

    /// Verify signature and expiry; return the decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;

        Ok(decoded.claims)
    }
}
