//! Mailcow REST API client.

pub mod client;
pub mod error;
pub mod types;

pub use client::{
    MailcowClient, ADD_MAILBOX_PATH, API_KEY_HEADER, LIST_MAILBOXES_PATH, VERSION_PATH,
};
pub use error::MailcowError;
pub use types::{
    check_api_response, ConnectionReport, MailboxInfo, MailboxRequest, MAX_RESPONSE_BYTES,
};
