//! Argon2id password hashing in PHC string format.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use bugline_common::error::{BuglineError, BuglineResult};
use uuid::Uuid;

pub fn hash_password(password: &str) -> BuglineResult<String> {
    // v4 UUIDs come from the OS RNG, which is all a salt needs.
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| BuglineError::Internal(format!("salt encoding failed: {e}")))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BuglineError::Internal(format!("password hashing failed: {e}")))
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> BuglineResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| BuglineError::Internal(format!("stored password hash is invalid: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
