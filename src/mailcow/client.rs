//! HTTP client for the Mailcow REST API.
//!
//! Headers are set explicitly and compression is never negotiated; the
//! Mailcow API front end rejects some automated clients, and a plain,
//! curl-like request shape is what it reliably accepts.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, warn};

use super::error::MailcowError;
use super::types::{
    check_api_response, parse_body, parse_mailbox_list, truncate, ConnectionReport, MailboxInfo,
    MailboxRequest, MAX_ERROR_BODY_CHARS, MAX_RESPONSE_BYTES,
};
use crate::config::MailcowConfig;

/// Header carrying the Mailcow API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Mailbox creation endpoint.
pub const ADD_MAILBOX_PATH: &str = "/api/v1/add/mailbox";

/// Mailbox listing endpoint.
pub const LIST_MAILBOXES_PATH: &str = "/api/v1/get/mailbox/all";

/// Version endpoint (no authentication).
pub const VERSION_PATH: &str = "/api/v1/get/status/version";

/// Client for one Mailcow server.
#[derive(Clone)]
pub struct MailcowClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for MailcowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailcowClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl MailcowClient {
    /// Create a client using the timeout and user agent from config.
    pub fn new(
        base_url: &str,
        api_key: &str,
        config: &MailcowConfig,
    ) -> Result<Self, MailcowError> {
        Self::with_timeout(
            base_url,
            api_key,
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )
    }

    /// Create a client with an explicit timeout.
    pub fn with_timeout(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, MailcowError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| MailcowError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authenticated(&self, builder: RequestBuilder) -> Result<RequestBuilder, MailcowError> {
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| MailcowError::Client("API key is not a valid header value".to_string()))?;
        Ok(builder.header(API_KEY_HEADER, key))
    }

    /// Send a request and return the JSON body of a 2xx response.
    async fn execute(&self, builder: RequestBuilder) -> Result<Value, MailcowError> {
        let response = builder.send().await.map_err(MailcowError::from_reqwest)?;
        let status = response.status();
        let bytes = read_body(response, MAX_RESPONSE_BYTES).await?;
        let text = String::from_utf8_lossy(&bytes);

        if !status.is_success() {
            return Err(MailcowError::Http {
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY_CHARS),
            });
        }

        parse_body(&text)
    }

    /// Create a mailbox. Returns the raw API reply on success.
    pub async fn create_mailbox(&self, request: &MailboxRequest) -> Result<Value, MailcowError> {
        debug!(address = %request.address(), "Creating Mailcow mailbox");

        let builder = self
            .client
            .post(self.endpoint(ADD_MAILBOX_PATH))
            .header(CONTENT_TYPE, "application/json")
            .json(&request.payload());
        let body = self.execute(self.authenticated(builder)?).await?;

        check_api_response(&body)?;
        Ok(body)
    }

    /// List all mailboxes on the server.
    pub async fn list_mailboxes(&self) -> Result<Vec<MailboxInfo>, MailcowError> {
        let builder = self.client.get(self.endpoint(LIST_MAILBOXES_PATH));
        let body = self.execute(self.authenticated(builder)?).await?;

        check_api_response(&body)?;
        parse_mailbox_list(body)
    }

    /// Server version. Does not send the API key.
    pub async fn get_version(&self) -> Result<String, MailcowError> {
        let body = self
            .execute(self.client.get(self.endpoint(VERSION_PATH)))
            .await?;
        check_api_response(&body)?;

        body.get("version")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                MailcowError::Decode(format!(
                    "no version in response: {}",
                    truncate(&body.to_string(), MAX_ERROR_BODY_CHARS)
                ))
            })
    }

    /// Check that the API is reachable and accepts the key.
    pub async fn test_connection(&self) -> ConnectionReport {
        match self.list_mailboxes().await {
            Ok(mailboxes) => ConnectionReport {
                success: true,
                message: "Connection successful".to_string(),
                mailbox_count: Some(mailboxes.len()),
            },
            Err(e) => {
                warn!(base_url = %self.base_url, "Mailcow connection test failed: {}", e);
                let message = match e {
                    MailcowError::Http { status, body } => {
                        format!("API returned status {status}: {body}")
                    }
                    other => format!("Connection failed: {other}"),
                };
                ConnectionReport {
                    success: false,
                    message,
                    mailbox_count: None,
                }
            }
        }
    }
}

/// Read the response body, failing once it exceeds `limit` bytes.
async fn read_body(mut response: Response, limit: usize) -> Result<Vec<u8>, MailcowError> {
    if let Some(content_length) = response.content_length() {
        if content_length > limit as u64 {
            return Err(too_large(content_length, limit));
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(MailcowError::from_reqwest)? {
        if body.len() + chunk.len() > limit {
            return Err(too_large((body.len() + chunk.len()) as u64, limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn too_large(size: u64, limit: usize) -> MailcowError {
    MailcowError::Decode(format!(
        "response too large: {size} bytes (max {limit} bytes)"
    ))
}
