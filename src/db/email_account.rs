//! Email account records and their links to users.

use super::DbPool;
use crate::{AppError, Result};

/// IMAP/SMTP account record, unique per address.
#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EmailAccount {
    /// Account ID.
    pub id: i64,
    /// Mailbox address (unique).
    pub email_id: String,
    /// Human-readable account label.
    pub account_name: String,
    /// Whether inbound mail is fetched.
    pub enable_incoming: bool,
    /// Whether outbound mail is sent through this account.
    pub enable_outgoing: bool,
    /// Mailbox password.
    pub password: String,
    /// IMAP server host.
    pub imap_server: String,
    /// SMTP server host.
    pub smtp_server: String,
    /// SMTP port.
    pub smtp_port: i64,
    /// Whether TLS is used.
    pub use_tls: bool,
    /// IMAP folder to poll.
    pub imap_folder: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl std::fmt::Debug for EmailAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailAccount")
            .field("id", &self.id)
            .field("email_id", &self.email_id)
            .field("account_name", &self.account_name)
            .field("imap_server", &self.imap_server)
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .finish_non_exhaustive()
    }
}

/// Data for creating a new email account.
#[derive(Clone)]
pub struct NewEmailAccount {
    /// Mailbox address.
    pub email_id: String,
    /// Human-readable account label.
    pub account_name: String,
    /// Mailbox password.
    pub password: String,
    /// Mail server host used for both IMAP and SMTP.
    pub server: String,
    /// SMTP port.
    pub smtp_port: u16,
    /// Whether TLS is used.
    pub use_tls: bool,
    /// IMAP folder to poll.
    pub imap_folder: String,
}

impl std::fmt::Debug for NewEmailAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewEmailAccount")
            .field("email_id", &self.email_id)
            .field("account_name", &self.account_name)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

const ACCOUNT_COLUMNS: &str = "id, email_id, account_name, enable_incoming, enable_outgoing, \
     password, imap_server, smtp_server, smtp_port, use_tls, imap_folder, created_at";

/// Repository for email accounts and user links.
pub struct EmailAccountRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> EmailAccountRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create an account with both incoming and outgoing mail enabled.
    pub async fn create(&self, new_account: &NewEmailAccount) -> Result<EmailAccount> {
        let result = sqlx::query(
            "INSERT INTO email_accounts
                (email_id, account_name, enable_incoming, enable_outgoing, password,
                 imap_server, smtp_server, smtp_port, use_tls, imap_folder)
             VALUES (?, ?, 1, 1, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_account.email_id)
        .bind(&new_account.account_name)
        .bind(&new_account.password)
        .bind(&new_account.server)
        .bind(&new_account.server)
        .bind(i64::from(new_account.smtp_port))
        .bind(new_account.use_tls)
        .bind(&new_account.imap_folder)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("email account".to_string()))
    }

    /// Return the existing account for the address, or create it.
    ///
    /// The boolean is true when a new record was inserted.
    pub async fn get_or_create(&self, new_account: &NewEmailAccount) -> Result<(EmailAccount, bool)> {
        if let Some(existing) = self.get_by_email_id(&new_account.email_id).await? {
            return Ok((existing, false));
        }
        Ok((self.create(new_account).await?, true))
    }

    /// Get an account by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<EmailAccount>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM email_accounts WHERE id = ?");
        let account = sqlx::query_as::<_, EmailAccount>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(account)
    }

    /// Get an account by address (case-insensitive).
    pub async fn get_by_email_id(&self, email_id: &str) -> Result<Option<EmailAccount>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM email_accounts WHERE email_id = ?");
        let account = sqlx::query_as::<_, EmailAccount>(&sql)
            .bind(email_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(account)
    }

    /// Check if an account exists for the address.
    pub async fn exists(&self, email_id: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM email_accounts WHERE email_id = ?)")
                .bind(email_id)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Link an account to a user.
    ///
    /// Returns false if the link already existed.
    pub async fn link_user(&self, user_id: i64, email_account_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO user_emails (user_id, email_account_id) VALUES (?, ?)",
        )
        .bind(user_id)
        .bind(email_account_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List accounts linked to a user, oldest link first.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<EmailAccount>> {
        let sql = format!(
            "SELECT {} FROM email_accounts a
             JOIN user_emails ue ON ue.email_account_id = a.id
             WHERE ue.user_id = ?
             ORDER BY ue.created_at, a.id",
            ACCOUNT_COLUMNS
                .split(", ")
                .map(|c| format!("a.{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let accounts = sqlx::query_as::<_, EmailAccount>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(accounts)
    }

    /// Count all accounts.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM email_accounts")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
