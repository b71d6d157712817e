//! Mailbox provisioning for newly created users.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::address::{derive_local_part, mailbox_address};
use super::password::generate_mailbox_password;
use crate::config::{MailcowConfig, ProvisioningConfig};
use crate::db::{
    CommentKind, CommentRepository, Database, EmailAccountRepository, ErrorLogRepository,
    NewEmailAccount, User, UserRepository,
};
use crate::events::UserEventSubscriber;
use crate::mailcow::{MailboxRequest, MailcowClient, MailcowError};
use crate::settings::{IntegrationSettings, SettingsProvider};
use crate::{AppError, Result};

/// Error log title for settings problems and skipped users.
pub const LOG_TITLE_INTEGRATION: &str = "Mailcow Integration";

/// Error log title for failed remote mailbox creation.
pub const LOG_TITLE_CREATE_FAILED: &str = "Mailcow mailbox creation failed";

/// Error log title for failed local email account reconciliation.
pub const LOG_TITLE_ASSIGN_FAILED: &str = "Mailcow Email Account assignment failed";

/// Why a user was not provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The user type does not get a mailbox.
    NotEligible,
    /// The integration is switched off.
    Disabled,
    /// URL, key or domain is missing.
    IncompleteSettings,
    /// No usable local part could be derived.
    InvalidAddress,
}

/// Which class of remote failure aborted provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Client could not be built.
    Client,
    /// Network failure or timeout.
    Transport,
    /// Non-2xx HTTP status.
    Http,
    /// 2xx response reporting failure.
    Api,
    /// Unreadable response.
    Decode,
}

impl From<&MailcowError> for FailureKind {
    fn from(e: &MailcowError) -> Self {
        match e {
            MailcowError::Client(_) => FailureKind::Client,
            MailcowError::Transport { .. } => FailureKind::Transport,
            MailcowError::Http { .. } => FailureKind::Http,
            MailcowError::Api(_) => FailureKind::Api,
            MailcowError::Decode(_) => FailureKind::Decode,
        }
    }
}

/// Result of one provisioning attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProvisionOutcome {
    /// Nothing was attempted.
    Skipped {
        /// Why.
        reason: SkipReason,
    },
    /// An email account for the address already exists; no remote call.
    AlreadyProvisioned {
        /// Derived mailbox address.
        address: String,
    },
    /// The remote mailbox could not be created.
    Failed {
        /// Derived mailbox address.
        address: String,
        /// Failure class.
        kind: FailureKind,
        /// Logged cause.
        message: String,
    },
    /// The remote mailbox was created.
    Created {
        /// Mailbox address.
        address: String,
        /// Linked local email account, if one was created or reused.
        email_account_id: Option<i64>,
        /// Notice for the operator.
        notice: String,
    },
}

impl ProvisionOutcome {
    fn skipped(reason: SkipReason) -> Self {
        ProvisionOutcome::Skipped { reason }
    }

    /// Whether a remote mailbox was created.
    pub fn is_created(&self) -> bool {
        matches!(self, ProvisionOutcome::Created { .. })
    }
}

/// Creates a Mailcow mailbox for new system users and links it locally.
pub struct MailboxProvisioner {
    db: Database,
    settings: Arc<dyn SettingsProvider>,
    mailcow: MailcowConfig,
    config: ProvisioningConfig,
}

impl MailboxProvisioner {
    /// Create a provisioner.
    pub fn new(
        db: Database,
        settings: Arc<dyn SettingsProvider>,
        mailcow: MailcowConfig,
        config: ProvisioningConfig,
    ) -> Self {
        Self {
            db,
            settings,
            mailcow,
            config,
        }
    }

    /// Whether the user's type is configured to receive a mailbox.
    pub fn is_eligible(&self, user: &User) -> bool {
        self.config
            .eligible_user_types
            .iter()
            .any(|t| t.trim().eq_ignore_ascii_case(user.user_type.as_str()))
    }

    /// Run the workflow for one user.
    ///
    /// Remote and reconciliation failures are logged and reported through
    /// the outcome; only local storage errors before the remote call are
    /// returned as `Err`.
    pub async fn provision(&self, user: &User) -> Result<ProvisionOutcome> {
        if !self.is_eligible(user) {
            debug!(user = %user.name, user_type = %user.user_type, "User not eligible for a mailbox");
            return Ok(ProvisionOutcome::skipped(SkipReason::NotEligible));
        }

        let settings = self.settings.get().await?;
        if !settings.enabled {
            debug!("Mailcow integration disabled");
            return Ok(ProvisionOutcome::skipped(SkipReason::Disabled));
        }
        if !settings.is_complete() {
            self.report(
                LOG_TITLE_INTEGRATION,
                "Mailcow settings missing: API URL, API Key, or Mail Domain",
            )
            .await;
            return Ok(ProvisionOutcome::skipped(SkipReason::IncompleteSettings));
        }

        let Some(local_part) = derive_local_part(user.email.as_deref(), &user.name) else {
            self.report(
                LOG_TITLE_INTEGRATION,
                &format!("Cannot derive a mailbox address for user {}", user.name),
            )
            .await;
            return Ok(ProvisionOutcome::skipped(SkipReason::InvalidAddress));
        };
        let address = mailbox_address(&local_part, &settings.mail_domain);

        if self.config.check_existing_account
            && EmailAccountRepository::new(self.db.pool())
                .exists(&address)
                .await?
        {
            self.report(
                LOG_TITLE_INTEGRATION,
                &format!("Email account {address} already exists, skipping mailbox creation"),
            )
            .await;
            return Ok(ProvisionOutcome::AlreadyProvisioned { address });
        }

        let display_name = user.display_name().unwrap_or(local_part.as_str()).to_string();
        let request = MailboxRequest {
            local_part,
            domain: settings.mail_domain.clone(),
            display_name,
            quota: self.config.quota_unit.from_mb(settings.default_quota_mb),
            password: generate_mailbox_password(self.config.password_length),
        };

        if let Err(e) = self.create_remote(&settings, &request).await {
            let message = failure_message(&e);
            self.report(LOG_TITLE_CREATE_FAILED, &format!("{address}: {message}"))
                .await;
            return Ok(ProvisionOutcome::Failed {
                address,
                kind: FailureKind::from(&e),
                message,
            });
        }
        info!("Mailbox created for {}", address);

        let email_account_id = if settings.auto_create_email_account {
            match self.reconcile(user, &settings, &request).await {
                Ok(id) => Some(id),
                Err(e) => {
                    self.report(
                        LOG_TITLE_ASSIGN_FAILED,
                        &format!("Email Account creation failed for {address}: {e}"),
                    )
                    .await;
                    None
                }
            }
        } else {
            None
        };

        let notice = if email_account_id.is_some() {
            format!("Successfully created mailbox and email account for {address}")
        } else {
            format!("Successfully created mailbox {address}")
        };
        info!("{}", notice);

        if let Err(e) = CommentRepository::new(self.db.pool())
            .add(
                user.id,
                CommentKind::Info,
                &format!("Mailcow mailbox created: {address}"),
            )
            .await
        {
            warn!(user = %user.name, "Failed to annotate user: {}", e);
        }

        Ok(ProvisionOutcome::Created {
            address,
            email_account_id,
            notice,
        })
    }

    async fn create_remote(
        &self,
        settings: &IntegrationSettings,
        request: &MailboxRequest,
    ) -> std::result::Result<(), MailcowError> {
        let client = MailcowClient::new(&settings.api_base_url, &settings.api_key, &self.mailcow)?;
        client.create_mailbox(request).await?;
        Ok(())
    }

    /// Create or reuse the local email account, point the user's email at
    /// it and link it to the user.
    async fn reconcile(
        &self,
        user: &User,
        settings: &IntegrationSettings,
        request: &MailboxRequest,
    ) -> Result<i64> {
        let address = request.address();
        let accounts = EmailAccountRepository::new(self.db.pool());

        let new_account = NewEmailAccount {
            email_id: address.clone(),
            account_name: format!("{} ({})", request.display_name, address),
            password: request.password.clone(),
            server: settings.server_host(),
            smtp_port: self.config.smtp_port,
            use_tls: self.config.use_tls,
            imap_folder: self.config.imap_folder.clone(),
        };

        let (account, created) = accounts
            .get_or_create(&new_account)
            .await
            .map_err(|e| AppError::Reconciliation(format!("email account: {e}")))?;
        if !created {
            debug!("Reusing existing email account {}", address);
        }

        let updated = UserRepository::new(self.db.pool())
            .set_email(user.id, &address)
            .await
            .map_err(|e| AppError::Reconciliation(format!("user email: {e}")))?;
        if !updated {
            return Err(AppError::Reconciliation(format!(
                "user {} no longer exists",
                user.name
            )));
        }

        accounts
            .link_user(user.id, account.id)
            .await
            .map_err(|e| AppError::Reconciliation(format!("user link: {e}")))?;

        Ok(account.id)
    }

    /// Log an error and record it in the error log.
    async fn report(&self, title: &str, message: &str) {
        error!(title, "{}", message);
        if let Err(e) = ErrorLogRepository::new(self.db.pool())
            .record(title, message)
            .await
        {
            warn!("Failed to write error log entry: {}", e);
        }
    }
}

fn failure_message(e: &MailcowError) -> String {
    match e {
        MailcowError::Api(msg) => format!("Mailcow API error: {msg}"),
        MailcowError::Transport { .. } => format!("Transport error: {e}"),
        MailcowError::Http { .. } => format!("HTTP error: {e}"),
        MailcowError::Client(_) | MailcowError::Decode(_) => format!("Unexpected error: {e}"),
    }
}

impl UserEventSubscriber for MailboxProvisioner {
    fn name(&self) -> &str {
        "mailcow-provisioner"
    }

    fn on_user_created<'a>(&'a self, user: &'a User) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            match self.provision(user).await {
                Ok(outcome) => debug!(user = %user.name, ?outcome, "Provisioning finished"),
                Err(e) => {
                    self.report(
                        LOG_TITLE_INTEGRATION,
                        &format!("Provisioning for user {} aborted: {e}", user.name),
                    )
                    .await;
                }
            }
            Ok(())
        })
    }
}
