//! REST access to the agenda backend.

mod client;
mod error_body;
pub mod routes;

pub use client::{AuthToken, Client, auth_token};
pub use error_body::{error_for_status, field_messages};
