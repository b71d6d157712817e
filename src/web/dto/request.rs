//! Request DTOs for the admin API.

use serde::Deserialize;

use crate::db::{NewUser, UserType};
use crate::settings::{IntegrationSettings, DEFAULT_QUOTA_MB};
use crate::web::error::ApiError;

/// Settings update request.
///
/// An absent or blank `api_key` keeps the stored key, unless the API URL
/// changes: the stored key is then dropped so it is never sent to a new host.
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    /// Integration switch.
    #[serde(default)]
    pub enabled: bool,
    /// Mailcow base URL.
    #[serde(default)]
    pub api_base_url: String,
    /// Mailcow API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Mail domain.
    #[serde(default)]
    pub mail_domain: String,
    /// Default quota in MB.
    #[serde(default)]
    pub default_quota_mb: Option<i64>,
    /// Whether to create a local email account after provisioning.
    #[serde(default)]
    pub auto_create_email_account: bool,
}

impl UpdateSettingsRequest {
    /// Merge into the stored settings.
    pub fn apply(self, current: &IntegrationSettings) -> IntegrationSettings {
        let same_url = same_base_url(&self.api_base_url, &current.api_base_url);
        let api_key = match self.api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => key,
            None if same_url => current.api_key.clone(),
            None => String::new(),
        };
        IntegrationSettings {
            enabled: self.enabled,
            api_base_url: self.api_base_url,
            api_key,
            mail_domain: self.mail_domain,
            default_quota_mb: self.default_quota_mb.unwrap_or(DEFAULT_QUOTA_MB),
            auto_create_email_account: self.auto_create_email_account,
        }
    }
}

fn same_base_url(requested: &str, stored: &str) -> bool {
    let trim = |url: &str| url.trim().trim_end_matches('/').to_string();
    trim(requested).eq_ignore_ascii_case(&trim(stored))
}

/// User creation request.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Login name.
    pub name: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Full name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// "System User" (default) or "Website User".
    #[serde(default)]
    pub user_type: Option<String>,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = ApiError;

    fn try_from(req: CreateUserRequest) -> Result<Self, Self::Error> {
        let user_type = match req.user_type.as_deref().map(str::trim) {
            None | Some("") => UserType::SystemUser,
            Some(s) => s.parse().map_err(|e: String| ApiError::unprocessable(e))?,
        };
        Ok(NewUser {
            name: req.name,
            email: req.email,
            full_name: req.full_name,
            first_name: req.first_name,
            user_type,
        })
    }
}

/// Error log query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorLogQuery {
    /// Maximum number of entries (default 50, at most 500).
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ErrorLogQuery {
    /// Default number of entries.
    pub const DEFAULT_LIMIT: i64 = 50;
    /// Upper bound on entries.
    pub const MAX_LIMIT: i64 = 500;

    /// Effective limit.
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}
