//! Mailbox address derivation.

/// Derive the mailbox local part for a user.
///
/// If the user's email contains `@`, the text before the first `@` is
/// used. Otherwise the login name is used, cut at its first `@`.
/// Returns `None` when both yield an empty local part.
///
/// # Examples
///
/// ```
/// use mailcow_provision::provisioning::derive_local_part;
///
/// assert_eq!(derive_local_part(Some("jane@external.example"), "jane.roe").as_deref(), Some("jane"));
/// assert_eq!(derive_local_part(None, "jdoe").as_deref(), Some("jdoe"));
/// ```
pub fn derive_local_part(email: Option<&str>, name: &str) -> Option<String> {
    let from_email = email
        .map(str::trim)
        .filter(|e| e.contains('@'))
        .and_then(|e| e.split('@').next())
        .map(str::trim)
        .filter(|local| !local.is_empty());

    let local = match from_email {
        Some(local) => local,
        None => name.trim().split('@').next().unwrap_or_default().trim(),
    };

    if local.is_empty() || local.contains(char::is_whitespace) {
        return None;
    }
    Some(local.to_string())
}

/// Join a local part with the configured domain.
pub fn mailbox_address(local_part: &str, domain: &str) -> String {
    format!("{local_part}@{domain}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_local_part_with_configured_domain() {
        let local = derive_local_part(Some("jane@external.example"), "jane").unwrap();
        assert_eq!(mailbox_address(&local, "corp.test"), "jane@corp.test");
    }

    #[test]
    fn test_name_without_at() {
        let local = derive_local_part(None, "jdoe").unwrap();
        assert_eq!(mailbox_address(&local, "corp.test"), "jdoe@corp.test");

        let local = derive_local_part(Some("not-an-address"), "jdoe").unwrap();
        assert_eq!(local, "jdoe");
    }

    #[test]
    fn test_name_domain_stripped() {
        assert_eq!(
            derive_local_part(None, "jdoe@old.example").as_deref(),
            Some("jdoe")
        );
        assert_eq!(derive_local_part(Some(""), "a@b@c").as_deref(), Some("a"));
    }

    #[test]
    fn test_email_wins_over_name() {
        assert_eq!(
            derive_local_part(Some("first.last@x.example"), "flast").as_deref(),
            Some("first.last")
        );
    }

    #[test]
    fn test_empty_email_local_part_falls_back_to_name() {
        assert_eq!(
            derive_local_part(Some("@x.example"), "jdoe").as_deref(),
            Some("jdoe")
        );
    }

    #[test]
    fn test_nothing_usable() {
        assert_eq!(derive_local_part(None, ""), None);
        assert_eq!(derive_local_part(Some("@x.example"), "@y.example"), None);
        assert_eq!(derive_local_part(None, "john doe"), None);
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(
            derive_local_part(Some("  jane@external.example "), "x").as_deref(),
            Some("jane")
        );
    }
}
