//! User comments and the error log.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::DbPool;
use crate::Result;

/// Kind of annotation attached to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentKind {
    /// Informational note.
    Info,
}

impl CommentKind {
    /// Convert to the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentKind::Info => "info",
        }
    }
}

impl fmt::Display for CommentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(CommentKind::Info),
            _ => Err(format!("unknown comment kind: {s}")),
        }
    }
}

/// An annotation on a user record.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    /// Comment ID.
    pub id: i64,
    /// Annotated user.
    pub user_id: i64,
    /// Annotation kind.
    pub kind: CommentKind,
    /// Text.
    pub content: String,
    /// Creation timestamp.
    pub created_at: String,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    user_id: i64,
    kind: String,
    content: String,
    created_at: String,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            user_id: row.user_id,
            kind: row.kind.parse().unwrap_or(CommentKind::Info),
            content: row.content,
            created_at: row.created_at,
        }
    }
}

/// Repository for user comments.
pub struct CommentRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Attach a comment to a user.
    pub async fn add(&self, user_id: i64, kind: CommentKind, content: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO user_comments (user_id, kind, content) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(kind.as_str())
            .bind(content)
            .execute(self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// List a user's comments, oldest first.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id, user_id, kind, content, created_at
             FROM user_comments WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }
}

/// An entry in the error log.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ErrorLogEntry {
    /// Entry ID.
    pub id: i64,
    /// Category, e.g. "Mailcow mailbox creation failed".
    pub title: String,
    /// Detail message.
    pub message: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// Repository for the error log.
pub struct ErrorLogRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ErrorLogRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Record an error under the given title.
    pub async fn record(&self, title: &str, message: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO error_log (title, message) VALUES (?, ?)")
            .bind(title)
            .bind(message)
            .execute(self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// List the most recent entries, newest first.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<ErrorLogEntry>> {
        let entries = sqlx::query_as::<_, ErrorLogEntry>(
            "SELECT id, title, message, created_at FROM error_log ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(entries)
    }
}
