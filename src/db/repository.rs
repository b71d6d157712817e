//! User repository.

use super::user::{NewUser, User, UserType};
use super::DbPool;
use crate::{AppError, Result};

/// Row type for users from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: Option<String>,
    full_name: Option<String>,
    first_name: Option<String>,
    user_type: String,
    created_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self> {
        let user_type: UserType = row.user_type.parse().map_err(|e: String| {
            tracing::warn!(user_id = row.id, "Stored user has an unknown user type: {}", e);
            AppError::Database(format!("user {} has invalid user_type: {}", row.id, e))
        })?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            full_name: row.full_name,
            first_name: row.first_name,
            user_type,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, name, email, full_name, first_name, user_type, created_at";

/// Repository for user records.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new user and return the stored record.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, full_name, first_name, user_type)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.full_name)
        .bind(&new_user.first_name)
        .bind(new_user.user_type.as_str())
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    /// Get a user by login name (case-insensitive).
    pub async fn get_by_name(&self, name: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE name = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(name)
            .fetch_optional(self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    /// Check if a login name is already taken.
    pub async fn name_exists(&self, name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE name = ?)")
            .bind(name)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// Overwrite the user's primary email address.
    ///
    /// Returns false if no user has the given ID.
    pub async fn set_email(&self, id: i64, email: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET email = ? WHERE id = ?")
            .bind(email)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
