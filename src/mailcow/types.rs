//! Request and response types for the Mailcow API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::MailcowError;

/// Maximum number of response body characters kept in errors.
pub const MAX_ERROR_BODY_CHARS: usize = 300;

/// Largest response body read from the Mailcow API (1 MiB).
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// A mailbox to create. Built per provisioning attempt, never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct MailboxRequest {
    /// Part of the address before `@`.
    pub local_part: String,
    /// Mail domain.
    pub domain: String,
    /// Display name.
    pub display_name: String,
    /// Quota in the unit the server expects.
    pub quota: i64,
    /// Initial password.
    pub password: String,
}

impl MailboxRequest {
    /// Full mailbox address.
    pub fn address(&self) -> String {
        format!("{}@{}", self.local_part, self.domain)
    }

    /// JSON body for `POST /api/v1/add/mailbox`.
    pub fn payload(&self) -> AddMailboxPayload<'_> {
        AddMailboxPayload {
            local_part: &self.local_part,
            domain: &self.domain,
            name: &self.display_name,
            quota: self.quota,
            active: "1",
            password: &self.password,
            password2: &self.password,
            force_pw_update: "0",
        }
    }
}

impl std::fmt::Debug for MailboxRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailboxRequest")
            .field("local_part", &self.local_part)
            .field("domain", &self.domain)
            .field("display_name", &self.display_name)
            .field("quota", &self.quota)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Wire format of the add-mailbox request.
#[derive(Serialize)]
pub struct AddMailboxPayload<'a> {
    local_part: &'a str,
    domain: &'a str,
    name: &'a str,
    quota: i64,
    active: &'static str,
    password: &'a str,
    password2: &'a str,
    force_pw_update: &'static str,
}

/// A mailbox as listed by `GET /api/v1/get/mailbox/all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxInfo {
    /// Full address.
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Mail domain.
    #[serde(default)]
    pub domain: String,
}

/// Result of a connection test against the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionReport {
    /// Whether the API answered successfully.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Number of mailboxes on the server, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailbox_count: Option<usize>,
}

/// Inspect a 2xx response body for an API-level failure.
///
/// Two shapes are recognised: `{"success": false, "msg": ...}` and the
/// native Mailcow result entries `{"type": "error"|"danger", "msg": ...}`,
/// either alone or inside an array.
pub fn check_api_response(body: &Value) -> Result<(), MailcowError> {
    match body {
        Value::Array(entries) => entries.iter().try_for_each(check_api_entry),
        _ => check_api_entry(body),
    }
}

fn check_api_entry(entry: &Value) -> Result<(), MailcowError> {
    let Some(obj) = entry.as_object() else {
        return Ok(());
    };

    let failed_flag = obj.get("success").is_some_and(is_false);
    let failed_type = obj
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| t.eq_ignore_ascii_case("error") || t.eq_ignore_ascii_case("danger"));

    if failed_flag || failed_type {
        return Err(MailcowError::Api(message_text(obj.get("msg"))));
    }
    Ok(())
}

fn is_false(value: &Value) -> bool {
    match value {
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_i64() == Some(0),
        Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "false" | "0"),
        _ => false,
    }
}

/// Flatten a Mailcow `msg` field (string, list, or anything else) to text.
pub fn message_text(msg: Option<&Value>) -> String {
    match msg {
        None | Some(Value::Null) => "Unknown error".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .map(|p| match p {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

/// Parse the mailbox list body. Mailcow answers `{}` when there are none.
pub fn parse_mailbox_list(body: Value) -> Result<Vec<MailboxInfo>, MailcowError> {
    match body {
        Value::Array(_) => {
            serde_json::from_value(body).map_err(|e| MailcowError::Decode(e.to_string()))
        }
        Value::Object(ref obj) if obj.is_empty() => Ok(Vec::new()),
        Value::Null => Ok(Vec::new()),
        other => Err(MailcowError::Decode(format!(
            "expected a mailbox list, got {}",
            truncate(&other.to_string(), MAX_ERROR_BODY_CHARS)
        ))),
    }
}

/// Parse a response body; an empty body is treated as JSON null.
pub fn parse_body(text: &str) -> Result<Value, MailcowError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| {
        MailcowError::Decode(format!(
            "{e}: {}",
            truncate(text, MAX_ERROR_BODY_CHARS)
        ))
    })
}

/// Truncate text to at most `max` characters.
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
