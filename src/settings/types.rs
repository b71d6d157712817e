//! Integration settings and their save-time validation.

use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

/// Default mailbox quota in megabytes.
pub const DEFAULT_QUOTA_MB: i64 = 1024;

/// Mailcow integration settings (singleton).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    /// Whether mailboxes are provisioned at all.
    #[serde(default)]
    pub enabled: bool,
    /// Mailcow base URL, e.g. `https://mail.corp.test`.
    #[serde(default)]
    pub api_base_url: String,
    /// Mailcow API key.
    #[serde(default)]
    pub api_key: String,
    /// Domain mailboxes are created in.
    #[serde(default)]
    pub mail_domain: String,
    /// Quota for new mailboxes in megabytes.
    #[serde(default = "default_quota_mb")]
    pub default_quota_mb: i64,
    /// Create and link a local email account after provisioning.
    #[serde(default)]
    pub auto_create_email_account: bool,
}

fn default_quota_mb() -> i64 {
    DEFAULT_QUOTA_MB
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base_url: String::new(),
            api_key: String::new(),
            mail_domain: String::new(),
            default_quota_mb: DEFAULT_QUOTA_MB,
            auto_create_email_account: false,
        }
    }
}

impl std::fmt::Debug for IntegrationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationSettings")
            .field("enabled", &self.enabled)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &mask_secret(&self.api_key))
            .field("mail_domain", &self.mail_domain)
            .field("default_quota_mb", &self.default_quota_mb)
            .field("auto_create_email_account", &self.auto_create_email_account)
            .finish()
    }
}

impl IntegrationSettings {
    /// Normalize and validate the settings before they are stored.
    ///
    /// - trims every string field
    /// - strips trailing slashes from the API URL, lowercases its scheme and
    ///   requires a literal `http://` or `https://` prefix followed by a host
    ///   when a URL is set
    /// - strips a leading `@` from the mail domain
    /// - requires URL, key and domain when the integration is enabled
    pub fn normalize(mut self) -> Result<Self> {
        self.api_base_url = canonical_scheme(self.api_base_url.trim().trim_end_matches('/'));
        self.api_key = self.api_key.trim().to_string();
        self.mail_domain = self
            .mail_domain
            .trim()
            .trim_start_matches('@')
            .trim()
            .to_string();

        if self.enabled {
            if self.api_base_url.is_empty() {
                return Err(AppError::Validation(
                    "API URL is required when Mailcow Integration is enabled".to_string(),
                ));
            }
            if self.api_key.is_empty() {
                return Err(AppError::Validation(
                    "API Key is required when Mailcow Integration is enabled".to_string(),
                ));
            }
            if self.mail_domain.is_empty() {
                return Err(AppError::Validation(
                    "Mail Domain is required when Mailcow Integration is enabled".to_string(),
                ));
            }
        }

        if !self.api_base_url.is_empty() && !has_http_scheme(&self.api_base_url) {
            return Err(AppError::Validation(format!(
                "API URL must start with http:// or https://: {}",
                self.api_base_url
            )));
        }

        if self.mail_domain.contains('@') || self.mail_domain.contains(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "invalid mail domain: {}",
                self.mail_domain
            )));
        }

        if self.default_quota_mb <= 0 {
            return Err(AppError::Validation(
                "default quota must be greater than zero".to_string(),
            ));
        }

        Ok(self)
    }

    /// Whether URL, key and domain are all present.
    pub fn is_complete(&self) -> bool {
        !self.api_base_url.trim().is_empty()
            && !self.api_key.trim().is_empty()
            && !self.mail_domain.trim().is_empty()
    }

    /// Mail server host derived from the API URL: scheme and trailing
    /// slashes removed.
    pub fn server_host(&self) -> String {
        let url = self.api_base_url.trim();
        let without_scheme = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .unwrap_or(url);
        without_scheme.trim_end_matches('/').to_string()
    }

    /// API key with everything but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        mask_secret(&self.api_key)
    }
}

const HTTP_SCHEMES: [&str; 2] = ["https://", "http://"];

/// Lowercase a case-insensitive `http://` or `https://` prefix.
///
/// Anything else is returned unchanged and rejected by `has_http_scheme`.
fn canonical_scheme(raw: &str) -> String {
    for scheme in HTTP_SCHEMES {
        if let Some(prefix) = raw.get(..scheme.len()) {
            if prefix.eq_ignore_ascii_case(scheme) {
                return format!("{scheme}{}", &raw[scheme.len()..]);
            }
        }
    }
    raw.to_string()
}

/// Literal lowercase prefix, then a host directly after the `//`.
///
/// The URL parser alone is too lenient here: it accepts `https:host`,
/// `https:/host` and backslashes, none of which `server_host` can strip.
fn has_http_scheme(url: &str) -> bool {
    let Some(rest) = HTTP_SCHEMES
        .iter()
        .find_map(|scheme| url.strip_prefix(scheme))
    else {
        return false;
    };
    if rest.is_empty()
        || rest.starts_with('/')
        || rest.contains('\\')
        || rest.contains(char::is_whitespace)
    {
        return false;
    }
    url::Url::parse(url).is_ok_and(|parsed| parsed.host_str().is_some_and(|h| !h.is_empty()))
}

fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return String::new();
    }
    if count <= 4 {
        return "*".repeat(count);
    }
    let visible: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_settings() -> IntegrationSettings {
        IntegrationSettings {
            enabled: true,
            api_base_url: "https://mail.corp.test".to_string(),
            api_key: "ABCDEF-123456".to_string(),
            mail_domain: "corp.test".to_string(),
            default_quota_mb: 1024,
            auto_create_email_account: true,
        }
    }

    #[test]
    fn test_defaults() {
        let settings = IntegrationSettings::default();
        assert!(!settings.enabled);
        assert_eq!(settings.default_quota_mb, 1024);
        assert!(!settings.auto_create_email_account);
        assert!(!settings.is_complete());
    }

    #[test]
    fn test_enabled_requires_each_field() {
        let mut s = enabled_settings();
        s.api_base_url = "  ".to_string();
        let err = s.normalize().unwrap_err();
        assert!(err.to_string().contains("API URL is required"));

        let mut s = enabled_settings();
        s.api_key = String::new();
        let err = s.normalize().unwrap_err();
        assert!(err.to_string().contains("API Key is required"));

        let mut s = enabled_settings();
        s.mail_domain = "@".to_string();
        let err = s.normalize().unwrap_err();
        assert!(err.to_string().contains("Mail Domain is required"));
    }

    #[test]
    fn test_disabled_allows_missing_fields() {
        let settings = IntegrationSettings::default().normalize().unwrap();
        assert!(!settings.enabled);
    }

    #[test]
    fn test_trailing_slashes_stripped() {
        let mut s = enabled_settings();
        s.api_base_url = " https://mail.corp.test/// ".to_string();
        let s = s.normalize().unwrap();
        assert_eq!(s.api_base_url, "https://mail.corp.test");
    }

    #[test]
    fn test_scheme_required() {
        let mut s = enabled_settings();
        s.api_base_url = "mail.corp.test".to_string();
        assert!(matches!(s.normalize(), Err(AppError::Validation(_))));

        let mut s = enabled_settings();
        s.api_base_url = "ftp://mail.corp.test".to_string();
        assert!(s.normalize().is_err());

        let mut s = enabled_settings();
        s.api_base_url = "https://".to_string();
        assert!(s.normalize().is_err());

        let mut s = IntegrationSettings::default();
        s.api_base_url = "mail.corp.test".to_string();
        assert!(s.normalize().is_err());
    }

    #[test]
    fn test_lenient_scheme_forms_rejected() {
        for url in [
            "https:mail.corp.test",
            "https:/mail.corp.test",
            "http:\\\\mail.corp.test",
            "http://\\mail.corp.test",
            "https:///mail.corp.test",
            "https:// mail.corp.test",
            "HTTPS:mail.corp.test",
            "Http:/mail.corp.test",
            "https//mail.corp.test",
        ] {
            let mut s = enabled_settings();
            s.api_base_url = url.to_string();
            assert!(
                matches!(s.normalize(), Err(AppError::Validation(_))),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_uppercase_scheme_stored_lowercase() {
        let mut s = enabled_settings();
        s.api_base_url = "HTTPS://mail.corp.test".to_string();
        let s = s.normalize().unwrap();
        assert_eq!(s.api_base_url, "https://mail.corp.test");
        assert_eq!(s.server_host(), "mail.corp.test");
    }

    #[test]
    fn test_every_scheme_casing_normalized() {
        // Every upper/lower combination of both schemes.
        for scheme in ["http", "https"] {
            for mask in 0u32..(1 << scheme.len()) {
                let cased: String = scheme
                    .chars()
                    .enumerate()
                    .map(|(i, c)| {
                        if mask & (1 << i) != 0 {
                            c.to_ascii_uppercase()
                        } else {
                            c
                        }
                    })
                    .collect();
                for separator in ["://", ":", ":/", ":\\\\", ":///"] {
                    let mut s = enabled_settings();
                    s.api_base_url = format!("{cased}{separator}mail.corp.test/");
                    match s.normalize() {
                        Ok(saved) => {
                            assert_eq!(separator, "://");
                            assert_eq!(
                                saved.api_base_url,
                                format!("{scheme}://mail.corp.test")
                            );
                            assert_eq!(saved.server_host(), "mail.corp.test");
                        }
                        Err(err) => {
                            assert_ne!(separator, "://", "{cased}: {err}");
                            assert!(matches!(err, AppError::Validation(_)));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_plain_http_accepted() {
        let mut s = enabled_settings();
        s.api_base_url = "http://10.0.0.5:8080/".to_string();
        assert_eq!(s.normalize().unwrap().api_base_url, "http://10.0.0.5:8080");
    }

    #[test]
    fn test_mail_domain_normalized() {
        let mut s = enabled_settings();
        s.mail_domain = "  @corp.test ".to_string();
        assert_eq!(s.normalize().unwrap().mail_domain, "corp.test");

        let mut s = enabled_settings();
        s.mail_domain = "corp@test".to_string();
        assert!(s.normalize().is_err());
    }

    #[test]
    fn test_quota_must_be_positive() {
        let mut s = enabled_settings();
        s.default_quota_mb = 0;
        assert!(s.normalize().is_err());
    }

    #[test]
    fn test_server_host() {
        let mut s = enabled_settings();
        assert_eq!(s.server_host(), "mail.corp.test");
        s.api_base_url = "http://mail.corp.test:8443/".to_string();
        assert_eq!(s.server_host(), "mail.corp.test:8443");
    }

    #[test]
    fn test_masked_api_key() {
        let s = enabled_settings();
        assert_eq!(s.masked_api_key(), "*********3456");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn test_debug_masks_api_key() {
        let debug = format!("{:?}", enabled_settings());
        assert!(!debug.contains("ABCDEF-123456"));
        assert!(debug.contains("3456"));
    }

    #[test]
    fn test_deserialize_defaults_quota() {
        let s: IntegrationSettings = serde_json::from_str(r#"{"enabled": false}"#).unwrap();
        assert_eq!(s.default_quota_mb, DEFAULT_QUOTA_MB);
    }
}
