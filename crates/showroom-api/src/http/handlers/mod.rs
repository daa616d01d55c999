//! HTTP request handlers for the REST API.

pub mod events;
pub mod health;
pub mod session;
