//! User service.

use tracing::info;

use crate::db::{
    Comment, CommentRepository, Database, EmailAccount, EmailAccountRepository, NewUser, User,
    UserRepository,
};
use crate::events::EventBus;
use crate::{AppError, Result};

/// Maximum length of a login name (in characters).
pub const MAX_NAME_LENGTH: usize = 140;

/// A user together with linked email accounts and annotations.
#[derive(Debug, Clone)]
pub struct UserDetail {
    /// The user record.
    pub user: User,
    /// Linked email accounts.
    pub email_accounts: Vec<EmailAccount>,
    /// Annotations, oldest first.
    pub comments: Vec<Comment>,
}

/// High-level user operations.
#[derive(Debug, Clone)]
pub struct UserService {
    db: Database,
    events: EventBus,
}

impl UserService {
    /// Create a service that dispatches to the given event bus.
    pub fn new(db: Database, events: EventBus) -> Self {
        Self { db, events }
    }

    /// The event bus new users are announced on.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Create a user and run the user-created subscribers.
    ///
    /// The returned record is re-read after the subscribers ran, so an
    /// email address assigned during provisioning is visible.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let name = new_user.name.trim().to_string();
        validate_name(&name)?;

        let repo = UserRepository::new(self.db.pool());
        if repo.name_exists(&name).await? {
            return Err(AppError::Conflict(format!("user {name}")));
        }

        let new_user = NewUser {
            name,
            email: non_blank(new_user.email),
            full_name: non_blank(new_user.full_name),
            first_name: non_blank(new_user.first_name),
            user_type: new_user.user_type,
        };
        let user = repo.create(&new_user).await?;
        info!(user = %user.name, user_type = %user.user_type, "User created");

        self.events.user_created(&user).await;

        Ok(repo.get_by_id(user.id).await?.unwrap_or(user))
    }

    /// Look up a user by login name.
    pub async fn get_user(&self, name: &str) -> Result<User> {
        UserRepository::new(self.db.pool())
            .get_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {name}")))
    }

    /// Look up a user with linked email accounts and annotations.
    pub async fn get_detail(&self, name: &str) -> Result<UserDetail> {
        let user = self.get_user(name).await?;
        let email_accounts = EmailAccountRepository::new(self.db.pool())
            .list_for_user(user.id)
            .await?;
        let comments = CommentRepository::new(self.db.pool())
            .list_for_user(user.id)
            .await?;
        Ok(UserDetail {
            user,
            email_accounts,
            comments,
        })
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
