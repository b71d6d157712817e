//! Settings provider with explicit cache invalidation.

use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;
use tracing::{debug, info};

use super::repository::SettingsRepository;
use super::types::IntegrationSettings;
use crate::db::Database;
use crate::Result;

/// Cache key the settings snapshot is held under.
pub const SETTINGS_CACHE_KEY: &str = "mailcow_settings";

/// Source of the current integration settings.
///
/// Implementations may cache; `invalidate` drops any cached snapshot so
/// the next `get` sees the stored values.
pub trait SettingsProvider: Send + Sync {
    /// Current settings snapshot.
    fn get(&self) -> BoxFuture<'_, Result<Arc<IntegrationSettings>>>;

    /// Drop any cached snapshot.
    fn invalidate(&self);

    /// Drop the cache and load fresh settings.
    fn reload(&self) -> BoxFuture<'_, Result<Arc<IntegrationSettings>>> {
        self.invalidate();
        self.get()
    }
}

/// Database-backed settings provider that memoizes the last snapshot.
pub struct CachedSettingsProvider {
    db: Database,
    cache: RwLock<Option<Arc<IntegrationSettings>>>,
}

impl CachedSettingsProvider {
    /// Create a provider reading from the given database.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            cache: RwLock::new(None),
        }
    }

    /// Validate, store and publish new settings.
    ///
    /// The cached snapshot is invalidated after every successful save.
    pub async fn save(&self, settings: IntegrationSettings) -> Result<Arc<IntegrationSettings>> {
        let settings = settings.normalize()?;
        SettingsRepository::new(self.db.pool()).store(&settings).await?;
        self.invalidate();
        info!(
            enabled = settings.enabled,
            api_url = %settings.api_base_url,
            mail_domain = %settings.mail_domain,
            "Mailcow settings saved"
        );
        Ok(Arc::new(settings))
    }

    /// Store an API key taken from the environment if none is stored yet.
    ///
    /// Returns true if the key was stored.
    pub async fn seed_api_key(&self, api_key: &str) -> Result<bool> {
        let repo = SettingsRepository::new(self.db.pool());
        let mut current = repo.load().await?;
        if !current.api_key.trim().is_empty() || api_key.trim().is_empty() {
            return Ok(false);
        }
        current.api_key = api_key.trim().to_string();
        repo.store(&current).await?;
        self.invalidate();
        info!("Mailcow API key seeded from environment");
        Ok(true)
    }

    fn cached(&self) -> Option<Arc<IntegrationSettings>> {
        match self.cache.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_cache(&self, value: Option<Arc<IntegrationSettings>>) {
        match self.cache.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }
}

impl SettingsProvider for CachedSettingsProvider {
    fn get(&self) -> BoxFuture<'_, Result<Arc<IntegrationSettings>>> {
        Box::pin(async move {
            if let Some(settings) = self.cached() {
                return Ok(settings);
            }

            let settings = Arc::new(SettingsRepository::new(self.db.pool()).load().await?);
            self.set_cache(Some(settings.clone()));
            debug!("Loaded {} into cache", SETTINGS_CACHE_KEY);
            Ok(settings)
        })
    }

    fn invalidate(&self) {
        self.set_cache(None);
        debug!("Invalidated cache key {}", SETTINGS_CACHE_KEY);
    }
}
