//! Application state wiring the conversation core to its infrastructure.
//!
//! `AppState` holds the concrete instances used by both the CLI and the
//! REST API. The core is generic over the catalog repository and the session
//! store; `AppState` pins them to the SQLite and in-memory implementations.

use std::path::PathBuf;
use std::sync::Arc;

use showroom_core::conversation::Conversation;
use showroom_core::session::InMemorySessionStore;
use showroom_infra::config::{
    MAX_SESSION_IDLE_TIMEOUT_SECS, MIN_SESSION_IDLE_TIMEOUT_SECS, load_config, resolve_data_dir,
};
use showroom_infra::sqlite::catalog::SqliteCatalogRepository;
use showroom_infra::sqlite::pool::{DatabasePool, database_url};
use showroom_types::config::ShowroomConfig;

/// Conversation pinned to the concrete infra implementations.
pub type ConcreteConversation = Conversation<SqliteCatalogRepository, InMemorySessionStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub conversation: Arc<ConcreteConversation>,
    pub catalog: Arc<SqliteCatalogRepository>,
    pub config: Arc<ShowroomConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, open the database,
    /// wire the conversation.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;
        let state = Self::open(data_dir, config).await?;
        tracing::debug!(
            data_dir = %state.data_dir.display(),
            admins = state.config.admin_ids.len(),
            "application state ready"
        );
        Ok(state)
    }

    /// Open the catalog database in `data_dir` and wire a fresh session store.
    pub async fn open(data_dir: PathBuf, config: ShowroomConfig) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&database_url(&data_dir, &config.database_file)).await?;
        let catalog = Arc::new(SqliteCatalogRepository::new(db_pool));

        let conversation = Conversation::new(
            Arc::clone(&catalog),
            Arc::new(InMemorySessionStore::new()),
            &config,
        );

        Ok(Self {
            conversation: Arc::new(conversation),
            catalog,
            config: Arc::new(config),
            data_dir,
        })
    }

    /// How long a session may sit idle before eviction, clamped to the
    /// same bounds `load_config` applies.
    pub fn session_idle_timeout(&self) -> chrono::Duration {
        let secs = self
            .config
            .session_idle_timeout_secs
            .clamp(MIN_SESSION_IDLE_TIMEOUT_SECS, MAX_SESSION_IDLE_TIMEOUT_SECS);
        i64::try_from(secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or_else(|| chrono::Duration::weeks(1))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub(crate) const ADMIN: &str = "1001";

    /// State over a throwaway database with one admin. Keep the returned
    /// directory alive for the duration of the test.
    pub(crate) async fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = ShowroomConfig {
            admin_ids: vec![ADMIN.to_string()],
            ..Default::default()
        };
        let state = AppState::open(dir.path().to_path_buf(), config)
            .await
            .unwrap();
        (state, dir)
    }
}
