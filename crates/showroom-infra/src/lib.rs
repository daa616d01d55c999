//! Infrastructure layer for Showroom.
//!
//! Implements the repository traits defined in `showroom-core`: the SQLite
//! catalog store, plus configuration loading and catalog seeding.

pub mod config;
pub mod seed;
pub mod sqlite;
