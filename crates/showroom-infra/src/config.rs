//! Configuration loader for Showroom.
//!
//! Reads `config.toml` from the data directory (`~/.showroom/` in production)
//! and deserializes it into [`ShowroomConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::{Path, PathBuf};

use showroom_types::config::ShowroomConfig;

/// Sessions never expire faster than this, whatever the file says.
pub const MIN_SESSION_IDLE_TIMEOUT_SECS: u64 = 60;

/// Upper bound on the idle timeout: one week.
pub const MAX_SESSION_IDLE_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

/// Resolve the data directory: `SHOWROOM_DATA_DIR` if set, otherwise
/// `~/.showroom`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SHOWROOM_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".showroom")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`ShowroomConfig::default()`].
/// - Unreadable or unparsable file: warning logged, defaults returned.
/// - The idle timeout is clamped to [`MIN_SESSION_IDLE_TIMEOUT_SECS`] ..=
///   [`MAX_SESSION_IDLE_TIMEOUT_SECS`].
pub async fn load_config(data_dir: &Path) -> ShowroomConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ShowroomConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ShowroomConfig::default();
        }
    };

    let mut config = match toml::from_str::<ShowroomConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            return ShowroomConfig::default();
        }
    };

    if config.session_idle_timeout_secs < MIN_SESSION_IDLE_TIMEOUT_SECS {
        tracing::warn!(
            configured = config.session_idle_timeout_secs,
            "session_idle_timeout_secs below minimum, using {MIN_SESSION_IDLE_TIMEOUT_SECS}"
        );
        config.session_idle_timeout_secs = MIN_SESSION_IDLE_TIMEOUT_SECS;
    } else if config.session_idle_timeout_secs > MAX_SESSION_IDLE_TIMEOUT_SECS {
        tracing::warn!(
            configured = config.session_idle_timeout_secs,
            "session_idle_timeout_secs above maximum, using {MAX_SESSION_IDLE_TIMEOUT_SECS}"
        );
        config.session_idle_timeout_secs = MAX_SESSION_IDLE_TIMEOUT_SECS;
    }
    config
}
