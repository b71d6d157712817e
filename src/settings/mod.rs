//! Mailcow integration settings.
//!
//! A single settings record (API URL, key, mail domain, quota, auto-link
//! flag) validated on save and served through a cached provider.

pub mod provider;
pub mod repository;
pub mod types;

pub use provider::{CachedSettingsProvider, SettingsProvider, SETTINGS_CACHE_KEY};
pub use repository::SettingsRepository;
pub use types::{IntegrationSettings, DEFAULT_QUOTA_MB};
