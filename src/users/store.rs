use axum::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use crate::error::AppError;
use crate::users::password;

/// Credentials as accepted at registration. The plaintext password is
/// write-only; it is hashed before it touches the database.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub is_admin: bool,
}

/// User projection: id, username and admin flag only. The stored hash and
/// salt are never re-read once written.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
}

#[derive(Debug, FromRow)]
struct StoredCredentials {
    password_hash: String,
}

/// Capability interface over the Users table, swappable for an in-memory
/// fake in tests.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// True when the username exists and the peppered password matches the
    /// stored hash; false for an unknown username or a mismatch.
    async fn verify_login(&self, username: &str, password: &str) -> Result<bool, AppError>;

    /// Insert a new user with a fresh salt; returns the assigned id.
    async fn register(&self, new: &NewUser) -> Result<i32, AppError>;

    /// False when the username is unknown.
    async fn is_admin(&self, username: &str) -> Result<bool, AppError>;

    async fn user_id(&self, username: &str) -> Result<Option<i32>, AppError>;

    async fn get_user(&self, id: i32) -> Result<Option<UserRecord>, AppError>;
}

pub struct PgUserStore {
    pool: PgPool,
    pepper: String,
}

impl PgUserStore {
    pub fn new(pool: PgPool, pepper: String) -> Self {
        Self { pool, pepper }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn verify_login(&self, username: &str, password: &str) -> Result<bool, AppError> {
        let stored = sqlx::query_as::<_, StoredCredentials>(
            r#"
            SELECT Password AS password_hash
            FROM Users
            WHERE Username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(stored) = stored else {
            debug!(username = %username, "login for unknown username");
            return Ok(false);
        };

        // The PHC string embeds the salt written to the Salt column at
        // registration, so verification recomputes with the stored salt.
        password::verify_password(password, &self.pepper, &stored.password_hash)
    }

    async fn register(&self, new: &NewUser) -> Result<i32, AppError> {
        let salt = password::generate_salt();
        let hash = password::hash_password(&new.password, &salt, &self.pepper)?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO Users (Username, Password, Salt, IsAdmin)
            VALUES ($1, $2, $3, $4)
            RETURNING UserId
            "#,
        )
        .bind(&new.username)
        .bind(&hash)
        .bind(salt.as_str())
        .bind(if new.is_admin { 1_i32 } else { 0_i32 })
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn is_admin(&self, username: &str) -> Result<bool, AppError> {
        let flag: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT IsAdmin <> 0
            FROM Users
            WHERE Username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(flag.unwrap_or(false))
    }

    async fn user_id(&self, username: &str) -> Result<Option<i32>, AppError> {
        let id: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT UserId
            FROM Users
            WHERE Username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn get_user(&self, id: i32) -> Result<Option<UserRecord>, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT UserId AS id, Username AS username, IsAdmin <> 0 AS is_admin
            FROM Users
            WHERE UserId = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
