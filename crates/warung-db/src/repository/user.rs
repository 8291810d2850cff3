//! # User Repository
//!
//! Users who can log in. Passwords are stored as argon2 PHC strings; hashing
//! and verification happen in the caller, this module only persists them.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use warung_core::{Role, User};

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Looks a user up by username (exact match).
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by ID, failing with `NotFound`.
    pub async fn get(&self, id: i64) -> DbResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Inserts a user.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Username already taken
    pub async fn create(&self, username: &str, password_hash: &str, role: Role) -> DbResult<User> {
        debug!(username, %role, "Inserting user");

        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match DbError::from(err) {
            DbError::UniqueViolation { .. } => DbError::duplicate("username", username),
            other => other,
        })?;

        info!(id = created.id, username, %role, "User created");
        Ok(created)
    }

    /// Counts all users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
