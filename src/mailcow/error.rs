//! Mailcow client errors.

use thiserror::Error;

/// Failure of a call to the Mailcow API.
///
/// Transport failures, HTTP error statuses and API-level failure payloads
/// are separate variants so callers can tell them apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MailcowError {
    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// The request never produced a response (connect failure, timeout, reset).
    #[error("request failed: {message}")]
    Transport {
        /// Underlying error text.
        message: String,
        /// Whether the configured timeout elapsed.
        timed_out: bool,
    },

    /// The server answered with a non-2xx status.
    #[error("API returned status {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The server answered 2xx but the body reports a failure.
    #[error("Mailcow API error: {0}")]
    Api(String),

    /// The response body was not the expected JSON.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl MailcowError {
    /// Whether this is a transport-level failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, MailcowError::Transport { .. })
    }

    /// Whether the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, MailcowError::Transport { timed_out: true, .. })
    }

    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        MailcowError::Transport {
            timed_out: e.is_timeout(),
            message: e.to_string(),
        }
    }
}
