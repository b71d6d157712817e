//! Configuration module for the provisioning service.
//!
//! This is the process configuration loaded from `config.toml`. The
//! Mailcow integration settings themselves (URL, API key, domain) live in
//! the database and are edited at runtime, see [`crate::settings`].

use serde::Deserialize;
use std::path::Path;

use crate::{AppError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bearer token required on every `/api` request.
    #[serde(default)]
    pub admin_token: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_token: None,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/mailcow.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/mailcow.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Mailcow HTTP client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailcowConfig {
    /// Total request timeout in seconds.
    #[serde(default = "default_mailcow_timeout")]
    pub timeout_secs: u64,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_mailcow_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("mailcow-provision/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for MailcowConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_mailcow_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Unit the Mailcow server expects the mailbox quota in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaUnit {
    /// Megabytes, sent as-is.
    #[default]
    Mb,
    /// Kibibytes, megabytes multiplied by 1024.
    Kib,
}

impl QuotaUnit {
    /// Convert a quota in megabytes into this unit.
    pub fn from_mb(&self, quota_mb: i64) -> i64 {
        match self {
            QuotaUnit::Mb => quota_mb,
            QuotaUnit::Kib => quota_mb.saturating_mul(1024),
        }
    }
}

/// Mailbox provisioning workflow configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvisioningConfig {
    /// User types that get a mailbox on creation.
    #[serde(default = "default_eligible_user_types")]
    pub eligible_user_types: Vec<String>,
    /// Skip provisioning when an email account for the address exists.
    #[serde(default = "default_check_existing_account")]
    pub check_existing_account: bool,
    /// Quota unit expected by the Mailcow API.
    #[serde(default)]
    pub quota_unit: QuotaUnit,
    /// Length of generated mailbox passwords.
    #[serde(default = "default_password_length")]
    pub password_length: usize,
    /// SMTP port stored on created email accounts.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// IMAP folder stored on created email accounts.
    #[serde(default = "default_imap_folder")]
    pub imap_folder: String,
    /// Whether created email accounts use TLS.
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
}

fn default_eligible_user_types() -> Vec<String> {
    vec!["System User".to_string()]
}

fn default_check_existing_account() -> bool {
    true
}

fn default_password_length() -> usize {
    16
}

fn default_smtp_port() -> u16 {
    587
}

fn default_imap_folder() -> String {
    "INBOX".to_string()
}

fn default_use_tls() -> bool {
    true
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            eligible_user_types: default_eligible_user_types(),
            check_existing_account: default_check_existing_account(),
            quota_unit: QuotaUnit::default(),
            password_length: default_password_length(),
            smtp_port: default_smtp_port(),
            imap_folder: default_imap_folder(),
            use_tls: default_use_tls(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Mailcow client configuration.
    #[serde(default)]
    pub mailcow: MailcowConfig,
    /// Provisioning workflow configuration.
    #[serde(default)]
    pub provisioning: ProvisioningConfig,
    /// API key seeded from the environment, never read from the file.
    #[serde(skip)]
    pub api_key_override: Option<String>,
}

/// Shortest password the workflow will generate.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Shortest accepted admin API token.
pub const MIN_ADMIN_TOKEN_LENGTH: usize = 16;

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(AppError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| AppError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `MAILCOW_API_KEY`: API key used when the stored settings have none
    /// - `MAILCOW_ADMIN_TOKEN`: bearer token for the admin API
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("MAILCOW_ADMIN_TOKEN") {
            if !token.trim().is_empty() {
                self.server.admin_token = Some(token.trim().to_string());
            }
        }
        if let Ok(api_key) = std::env::var("MAILCOW_API_KEY") {
            if !api_key.is_empty() {
                self.api_key_override = Some(api_key);
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        match self.server.admin_token.as_deref().map(str::trim) {
            Some(token) if token.len() >= MIN_ADMIN_TOKEN_LENGTH => {}
            _ => {
                return Err(AppError::Config(format!(
                    "server.admin_token (or MAILCOW_ADMIN_TOKEN) must be set to at least \
                     {MIN_ADMIN_TOKEN_LENGTH} characters"
                )));
            }
        }
        if self.mailcow.timeout_secs == 0 {
            return Err(AppError::Config(
                "mailcow.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.provisioning.password_length < MIN_PASSWORD_LENGTH {
            return Err(AppError::Config(format!(
                "provisioning.password_length must be at least {MIN_PASSWORD_LENGTH}"
            )));
        }
        if self.provisioning.eligible_user_types.is_empty() {
            return Err(AppError::Config(
                "provisioning.eligible_user_types must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
