//! Conversation core and repository trait definitions for Showroom.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus everything that drives a conversation: the
//! navigation codec, the session store, the add/edit wizards, the image
//! collector, commit/abort, and the per-user dispatcher. It depends only on
//! `showroom-types` -- never on `showroom-infra` or any database/IO crate.

pub mod commit;
pub mod conversation;
pub mod navigation;
pub mod repository;
pub mod session;
pub mod wizard;

#[cfg(test)]
pub(crate) mod testing;
