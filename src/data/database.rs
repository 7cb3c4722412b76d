//! SQLite database operations
//!
//! All database access goes through this module. Queries are
//! parameterized; the unique index on `users.email` is the authoritative
//! guard against duplicate registrations, the handler-level existence
//! check is advisory only.

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::Duration;

use super::models::{Secret, SecretWithAuthor, User, OAUTH_PASSWORD_SENTINEL};
use crate::error::AppError;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        // Single connection: SQLite is single-writer for this workload,
        // and one connection guarantees a committed insert is visible to
        // the very next query (the session extractor reads the user row
        // right after registration commits it).
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Look up a user by email (exact match).
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Look up a user by id. Used to rehydrate the session user per request.
    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Look up a user by Google subject identifier.
    pub async fn find_user_by_google_id(&self, google_id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE google_id = ?")
            .bind(google_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Insert a locally-registered user with an already-hashed password.
    ///
    /// A unique violation on `email` is reported as
    /// [`AppError::DuplicateEmail`], which also covers the race where two
    /// registrations for the same email pass the existence check
    /// concurrently.
    pub async fn insert_user(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password, created_at)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(error) => {
                if error
                    .as_database_error()
                    .is_some_and(|db| db.is_unique_violation())
                {
                    Err(AppError::DuplicateEmail)
                } else {
                    Err(error.into())
                }
            }
        }
    }

    /// Find or create the user for a Google identity, atomically.
    ///
    /// If a user with this email already exists (local-password account
    /// included), that user is returned and its `google_id` is backfilled
    /// if absent. Otherwise a new user is created with the OAuth password
    /// sentinel.
    pub async fn upsert_google_user(
        &self,
        email: &str,
        google_id: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password, google_id, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(email) DO UPDATE SET
                google_id = COALESCE(users.google_id, excluded.google_id)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(OAUTH_PASSWORD_SENTINEL)
        .bind(google_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    // =========================================================================
    // Secrets
    // =========================================================================

    /// Insert a secret owned by the given user.
    pub async fn insert_secret(&self, secret: &str, user_id: i64) -> Result<Secret, AppError> {
        let secret = sqlx::query_as::<_, Secret>(
            r#"
            INSERT INTO secrets (secret, user_id, created_at)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(secret)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(secret)
    }

    /// List all secrets joined with their owner's email, newest first.
    pub async fn list_secrets_with_authors(&self) -> Result<Vec<SecretWithAuthor>, AppError> {
        let secrets = sqlx::query_as::<_, SecretWithAuthor>(
            r#"
            SELECT secrets.id, secrets.secret, users.email
            FROM secrets
            JOIN users ON secrets.user_id = users.id
            ORDER BY secrets.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(secrets)
    }
}
