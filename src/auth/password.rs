//! Password Hashing
//! Mission: One-way salted hashing with a brute-force-resistant cost factor

use anyhow::{Context, Result};

/// bcrypt work factor. Keeps a single hash in the tens-of-milliseconds range.
const HASH_COST: u32 = 10;

/// Hash a plaintext password with bcrypt.
pub fn hash_password(plaintext: &str) -> Result<String> {
    bcrypt::hash(plaintext, HASH_COST).context("Failed to hash password")
}

/// Verify a plaintext password against a stored bcrypt digest.
///
/// Returns `false` on any failure (wrong password, malformed digest) so the
/// caller cannot tell which half of credential validation failed.
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    bcrypt::verify(plaintext, digest).unwrap_or(false)
}
