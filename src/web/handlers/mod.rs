//! API handlers for the admin API.

pub mod diagnostics;
pub mod settings;
pub mod users;

pub use diagnostics::*;
pub use settings::*;
pub use users::*;

use std::sync::Arc;

use crate::config::MailcowConfig;
use crate::db::Database;
use crate::provisioning::MailboxProvisioner;
use crate::settings::CachedSettingsProvider;
use crate::users::UserService;
use crate::web::middleware::AdminToken;

/// Shared state for handlers.
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Settings provider.
    pub settings: Arc<CachedSettingsProvider>,
    /// User service (dispatches user-created events).
    pub users: UserService,
    /// Provisioner for manual re-runs.
    pub provisioner: Arc<MailboxProvisioner>,
    /// Mailcow client configuration for diagnostics.
    pub mailcow: MailcowConfig,
    /// Bearer token required on every `/api` route.
    pub admin_token: Arc<AdminToken>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Database,
        settings: Arc<CachedSettingsProvider>,
        users: UserService,
        provisioner: Arc<MailboxProvisioner>,
        mailcow: MailcowConfig,
        admin_token: AdminToken,
    ) -> Self {
        Self {
            db,
            settings,
            users,
            provisioner,
            mailcow,
            admin_token: Arc::new(admin_token),
        }
    }
}
