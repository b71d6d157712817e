//! Data Transfer Objects for the admin API.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
