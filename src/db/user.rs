//! User model.

use std::fmt;
use std::str::FromStr;

/// Kind of user account.
///
/// Only system users (staff accounts) receive a mailbox by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserType {
    /// Internal staff account with desk access.
    #[default]
    SystemUser,
    /// External account (customer, supplier portal user).
    WebsiteUser,
}

impl UserType {
    /// Convert to the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::SystemUser => "System User",
            UserType::WebsiteUser => "Website User",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "system user" | "system_user" | "system" => Ok(UserType::SystemUser),
            "website user" | "website_user" | "website" => Ok(UserType::WebsiteUser),
            _ => Err(format!("unknown user type: {s}")),
        }
    }
}

/// A persisted user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login name (unique). May itself be an email address.
    pub name: String,
    /// Primary email address.
    pub email: Option<String>,
    /// Full display name.
    pub full_name: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Account kind.
    pub user_type: UserType,
    /// Creation timestamp.
    pub created_at: String,
}

impl User {
    /// Best available human-readable name, if any.
    pub fn display_name(&self) -> Option<&str> {
        [self.full_name.as_deref(), self.first_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login name.
    pub name: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Full name (optional).
    pub full_name: Option<String>,
    /// First name (optional).
    pub first_name: Option<String>,
    /// Account kind (defaults to system user).
    pub user_type: UserType,
}

impl NewUser {
    /// Create a new system user with only a login name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            full_name: None,
            first_name: None,
            user_type: UserType::SystemUser,
        }
    }

    /// Set the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the full name.
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Set the first name.
    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Set the user type.
    pub fn with_user_type(mut self, user_type: UserType) -> Self {
        self.user_type = user_type;
        self
    }
}
