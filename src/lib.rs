//! mailcow-provision - Mailcow mailbox provisioning for new users.
//!
//! Creates a mailbox on a Mailcow server when a system user is created and
//! optionally links it to the user as a local email account.

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod logging;
pub mod mailcow;
pub mod provisioning;
pub mod settings;
pub mod users;
pub mod web;

pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository, UserType};
pub use error::{AppError, Result};
pub use events::{EventBus, UserEventSubscriber};
pub use mailcow::{MailcowClient, MailcowError};
pub use provisioning::{MailboxProvisioner, ProvisionOutcome};
pub use settings::{CachedSettingsProvider, IntegrationSettings, SettingsProvider};
pub use users::UserService;
