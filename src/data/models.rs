//! Data models
//!
//! Rust structs representing database entities. IDs are store-assigned
//! integers; timestamps use chrono.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored password value for accounts created through Google sign-in.
///
/// Not a valid bcrypt hash, so local login against such an account
/// always fails credential verification.
pub const OAUTH_PASSWORD_SENTINEL: &str = "******";

/// A registered user
///
/// Created on local registration or first Google sign-in.
/// `password` holds a bcrypt PHC string, or [`OAUTH_PASSWORD_SENTINEL`]
/// for Google-only accounts.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    /// Unique across all users
    pub email: String,
    /// bcrypt hash or the OAuth sentinel
    pub password: String,
    /// Stable Google subject identifier, if the account has one
    pub google_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this account was created through Google sign-in only.
    pub fn is_oauth_only(&self) -> bool {
        self.password == OAUTH_PASSWORD_SENTINEL
    }
}

/// A secret submitted by a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Secret {
    pub id: i64,
    /// Free-form secret text
    pub secret: String,
    /// Owning user
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A secret joined with its owner's email, for the listing page
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SecretWithAuthor {
    pub id: i64,
    pub secret: String,
    pub email: String,
}
