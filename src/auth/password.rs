//! Argon2 password hashing for stored credentials.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::error;

use crate::error::ApiError;

/// Hash a plain-text password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    if password.is_empty() {
        return Err(ApiError::bad_request("Password cannot be empty"));
    }

    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "Argon2 password hashing failed");
            ApiError::internal_server_error("Server error")
        })
}

/// Verify a plain-text password against a stored PHC hash string.
///
/// Returns `Ok(false)` on mismatch; a malformed stored hash is a server error.
pub fn verify_password(stored_hash: &str, provided: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!(error = %e, "Stored password hash is malformed");
        ApiError::internal_server_error("Server error")
    })?;

    match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => {
            error!(error = %e, "Argon2 password verification failed");
            Err(ApiError::internal_server_error("Server error"))
        }
    }
}
