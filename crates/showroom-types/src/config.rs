//! Global configuration types for Showroom.
//!
//! `ShowroomConfig` represents the top-level `config.toml` that controls
//! who may run the admin flows, how long idle sessions live, and where the
//! catalog database lives.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.showroom/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowroomConfig {
    /// User ids allowed to add and edit products.
    #[serde(default)]
    pub admin_ids: Vec<String>,

    /// Seconds of inactivity after which a session and its draft are dropped.
    #[serde(default = "default_session_idle_timeout_secs")]
    pub session_idle_timeout_secs: u64,

    /// SQLite file name inside the data directory.
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

fn default_session_idle_timeout_secs() -> u64 {
    1800
}

fn default_database_file() -> String {
    "showroom.db".to_string()
}

impl Default for ShowroomConfig {
    fn default() -> Self {
        Self {
            admin_ids: Vec::new(),
            session_idle_timeout_secs: default_session_idle_timeout_secs(),
            database_file: default_database_file(),
        }
    }
}
