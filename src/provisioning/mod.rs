//! Mailbox provisioning workflow.
//!
//! Runs once per new user: eligibility, settings gate, address derivation,
//! duplicate check, remote creation, optional local email account, and an
//! annotation on the user. Nothing is retried; a remote mailbox created
//! before a local failure is left in place.

pub mod address;
pub mod password;
pub mod workflow;

pub use address::{derive_local_part, mailbox_address};
pub use password::generate_mailbox_password;
pub use workflow::{
    FailureKind, MailboxProvisioner, ProvisionOutcome, SkipReason, LOG_TITLE_ASSIGN_FAILED,
    LOG_TITLE_CREATE_FAILED, LOG_TITLE_INTEGRATION,
};
