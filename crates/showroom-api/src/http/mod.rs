//! HTTP transport for Showroom.
//!
//! Axum-based REST API at `/api/v1/` with the envelope response format and
//! CORS support. A chat platform adapter posts every user interaction to
//! `/api/v1/events` and renders the returned reply.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
