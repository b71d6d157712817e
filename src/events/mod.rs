//! User lifecycle events.
//!
//! Subscribers are registered on an [`EventBus`] at startup and invoked
//! after a user record has been committed. A failing subscriber is logged
//! and never fails the operation that created the user.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::db::User;
use crate::Result;

/// Receiver of user lifecycle events.
pub trait UserEventSubscriber: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Called once after a new user has been stored.
    fn on_user_created<'a>(&'a self, user: &'a User) -> BoxFuture<'a, Result<()>>;
}

/// Registry of user event subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Vec<Arc<dyn UserEventSubscriber>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Subscribers run in registration order.
    pub fn register(&mut self, subscriber: Arc<dyn UserEventSubscriber>) {
        debug!("Registered user event subscriber {}", subscriber.name());
        self.subscribers.push(subscriber);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_subscriber(mut self, subscriber: Arc<dyn UserEventSubscriber>) -> Self {
        self.register(subscriber);
        self
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether no subscribers are registered.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Dispatch the user-created event to every subscriber.
    ///
    /// Returns the number of subscribers that reported an error.
    pub async fn user_created(&self, user: &User) -> usize {
        let mut failures = 0;
        for subscriber in &self.subscribers {
            if let Err(e) = subscriber.on_user_created(user).await {
                failures += 1;
                warn!(
                    subscriber = subscriber.name(),
                    user = %user.name,
                    "User-created subscriber failed: {}",
                    e
                );
            }
        }
        failures
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field(
                "subscribers",
                &self.subscribers.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
