//! User creation and lookup.
//!
//! Creating a user commits the record first and then dispatches the
//! user-created event; subscriber failures never fail the creation.

pub mod service;

pub use service::{UserDetail, UserService, MAX_NAME_LENGTH};
