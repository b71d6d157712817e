//! Persistence for the settings singleton.

use super::types::IntegrationSettings;
use crate::db::DbPool;
use crate::Result;

#[derive(sqlx::FromRow)]
struct SettingsRow {
    enabled: bool,
    api_url: String,
    api_key: String,
    mail_domain: String,
    default_quota_mb: i64,
    auto_create_email_account: bool,
}

impl From<SettingsRow> for IntegrationSettings {
    fn from(row: SettingsRow) -> Self {
        IntegrationSettings {
            enabled: row.enabled,
            api_base_url: row.api_url,
            api_key: row.api_key,
            mail_domain: row.mail_domain,
            default_quota_mb: row.default_quota_mb,
            auto_create_email_account: row.auto_create_email_account,
        }
    }
}

/// Repository for the single settings row.
pub struct SettingsRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Load the stored settings, falling back to defaults if the row is missing.
    pub async fn load(&self) -> Result<IntegrationSettings> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT enabled, api_url, api_key, mail_domain, default_quota_mb,
                    auto_create_email_account
             FROM mailcow_settings WHERE id = 1",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(IntegrationSettings::from).unwrap_or_default())
    }

    /// Store settings as-is. Callers validate first.
    pub async fn store(&self, settings: &IntegrationSettings) -> Result<()> {
        sqlx::query(
            "INSERT INTO mailcow_settings
                (id, enabled, api_url, api_key, mail_domain, default_quota_mb,
                 auto_create_email_account, updated_at)
             VALUES (1, ?, ?, ?, ?, ?, ?, datetime('now'))
             ON CONFLICT(id) DO UPDATE SET
                enabled = excluded.enabled,
                api_url = excluded.api_url,
                api_key = excluded.api_key,
                mail_domain = excluded.mail_domain,
                default_quota_mb = excluded.default_quota_mb,
                auto_create_email_account = excluded.auto_create_email_account,
                updated_at = excluded.updated_at",
        )
        .bind(settings.enabled)
        .bind(&settings.api_base_url)
        .bind(&settings.api_key)
        .bind(&settings.mail_domain)
        .bind(settings.default_quota_mb)
        .bind(settings.auto_create_email_account)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
