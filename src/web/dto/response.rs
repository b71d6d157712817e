//! Response DTOs for the admin API.

use serde::Serialize;

use crate::db::{Comment, EmailAccount, User};
use crate::settings::IntegrationSettings;
use crate::users::UserDetail;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Integration settings with the API key masked.
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    /// Integration switch.
    pub enabled: bool,
    /// Mailcow base URL.
    pub api_base_url: String,
    /// Masked API key.
    pub api_key: String,
    /// Whether an API key is stored.
    pub api_key_set: bool,
    /// Mail domain.
    pub mail_domain: String,
    /// Default quota in MB.
    pub default_quota_mb: i64,
    /// Whether a local email account is created after provisioning.
    pub auto_create_email_account: bool,
}

impl From<&IntegrationSettings> for SettingsResponse {
    fn from(s: &IntegrationSettings) -> Self {
        Self {
            enabled: s.enabled,
            api_base_url: s.api_base_url.clone(),
            api_key: s.masked_api_key(),
            api_key_set: !s.api_key.is_empty(),
            mail_domain: s.mail_domain.clone(),
            default_quota_mb: s.default_quota_mb,
            auto_create_email_account: s.auto_create_email_account,
        }
    }
}

/// User information.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: i64,
    /// Login name.
    pub name: String,
    /// Email address.
    pub email: Option<String>,
    /// Full name.
    pub full_name: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// User type label.
    pub user_type: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            full_name: user.full_name,
            first_name: user.first_name,
            user_type: user.user_type.to_string(),
            created_at: user.created_at,
        }
    }
}

/// Email account information. The password is never returned.
#[derive(Debug, Serialize)]
pub struct EmailAccountResponse {
    /// Account ID.
    pub id: i64,
    /// Mailbox address.
    pub email_id: String,
    /// Account label.
    pub account_name: String,
    /// Incoming enabled.
    pub enable_incoming: bool,
    /// Outgoing enabled.
    pub enable_outgoing: bool,
    /// IMAP host.
    pub imap_server: String,
    /// SMTP host.
    pub smtp_server: String,
    /// SMTP port.
    pub smtp_port: i64,
    /// TLS flag.
    pub use_tls: bool,
    /// IMAP folder.
    pub imap_folder: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<EmailAccount> for EmailAccountResponse {
    fn from(a: EmailAccount) -> Self {
        Self {
            id: a.id,
            email_id: a.email_id,
            account_name: a.account_name,
            enable_incoming: a.enable_incoming,
            enable_outgoing: a.enable_outgoing,
            imap_server: a.imap_server,
            smtp_server: a.smtp_server,
            smtp_port: a.smtp_port,
            use_tls: a.use_tls,
            imap_folder: a.imap_folder,
            created_at: a.created_at,
        }
    }
}

/// User with linked email accounts and annotations.
#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    /// User record.
    pub user: UserResponse,
    /// Linked email accounts.
    pub email_accounts: Vec<EmailAccountResponse>,
    /// Annotations.
    pub comments: Vec<Comment>,
}

impl From<UserDetail> for UserDetailResponse {
    fn from(detail: UserDetail) -> Self {
        Self {
            user: detail.user.into(),
            email_accounts: detail.email_accounts.into_iter().map(Into::into).collect(),
            comments: detail.comments,
        }
    }
}

/// Mailcow server version.
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    /// Version string reported by the server.
    pub version: String,
}
