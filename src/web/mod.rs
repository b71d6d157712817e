//! Admin HTTP API.
//!
//! JSON endpoints for editing the integration settings, creating and
//! inspecting users, re-running provisioning and checking the Mailcow
//! connection.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_app, create_router};
pub use server::{build_state, WebServer};
