//! Shared domain types for Showroom.
//!
//! This crate contains the domain types used across the workspace: the
//! catalog (categories, subcategories, products, images), navigation
//! tokens, conversation sessions and drafts, inbound events, outbound
//! replies, configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod navigation;
pub mod reply;
pub mod session;
