//! Local credential verification (bcrypt)
//!
//! [`hash_password`] hashes a plaintext password with a configurable
//! bcrypt cost and returns the PHC string stored in `users.password`.
//! [`verify_credentials`] is the local login path: it looks the user up
//! by email and compares the submitted plaintext against the stored hash.
//!
//! A stored value that bcrypt cannot parse (notably the OAuth sentinel on
//! Google-only accounts) counts as a mismatch, never an error.

use thiserror::Error;

use crate::data::{Database, User};
use crate::error::AppError;

/// Why a login attempt was refused.
///
/// Both variants are user-facing flash messages, never 5xx responses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialFailure {
    #[error("User not found.")]
    UserNotFound,
    #[error("Incorrect password.")]
    BadCredentials,
}

/// Hash a password with bcrypt at the given cost factor.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    bcrypt::hash(password, cost).map_err(|e| AppError::Internal(e.into()))
}

/// Check a plaintext password against a stored bcrypt hash.
///
/// Returns `false` for mismatches and for stored values that are not
/// valid bcrypt hashes.
pub fn password_matches(password: &str, stored_hash: &str) -> bool {
    bcrypt::verify(password, stored_hash).unwrap_or(false)
}

/// Verify a username (email) + password pair against the store.
///
/// On success returns the authenticated [`User`]. Refusals come back as
/// `Ok(Err(CredentialFailure))`; only store failures are `Err`.
pub async fn verify_credentials(
    db: &Database,
    email: &str,
    password: &str,
) -> Result<std::result::Result<User, CredentialFailure>, AppError> {
    let Some(user) = db.find_user_by_email(email).await? else {
        return Ok(Err(CredentialFailure::UserNotFound));
    };

    if password_matches(password, &user.password) {
        Ok(Ok(user))
    } else {
        Ok(Err(CredentialFailure::BadCredentials))
    }
}
