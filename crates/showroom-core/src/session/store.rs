//! Session store.
//!
//! One live `Session` per user, held in a `DashMap`. Every operation takes
//! the entry's shard lock, so a mutator passed to `update` never interleaves
//! with another write for the same user.

use chrono::{Duration, Utc};
use dashmap::DashMap;
use showroom_types::session::{Session, UserId};
use tracing::debug;

/// Storage for per-user conversation sessions.
///
/// Injected into the dispatcher so tests and transports can supply their
/// own. Implementations must stamp `touched_at` on every write.
pub trait SessionStore: Send + Sync {
    /// Snapshot of the user's session, if one exists.
    fn get(&self, user_id: &str) -> Option<Session>;

    /// Replace the user's session.
    fn put(&self, user_id: &str, session: Session);

    /// Mutate the user's session in place, creating an idle one first if
    /// needed. Returns whatever the mutator returns.
    fn update<T>(&self, user_id: &str, mutator: impl FnOnce(&mut Session) -> T) -> T;

    /// Drop the user's session. Returns whether one existed.
    fn clear(&self, user_id: &str) -> bool;

    /// Drop every session untouched for longer than `max_idle`.
    /// Returns the number evicted.
    fn evict_idle(&self, max_idle: Duration) -> usize;

    /// Number of live sessions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<UserId, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, user_id: &str) -> Option<Session> {
        self.sessions.get(user_id).map(|entry| entry.value().clone())
    }

    fn put(&self, user_id: &str, mut session: Session) {
        session.touched_at = Utc::now();
        self.sessions.insert(user_id.to_string(), session);
    }

    fn update<T>(&self, user_id: &str, mutator: impl FnOnce(&mut Session) -> T) -> T {
        let mut entry = self.sessions.entry(user_id.to_string()).or_default();
        let result = mutator(entry.value_mut());
        entry.touched_at = Utc::now();
        result
    }

    fn clear(&self, user_id: &str) -> bool {
        self.sessions.remove(user_id).is_some()
    }

    fn evict_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.touched_at >= cutoff);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            debug!(evicted, "evicted idle sessions");
        }
        evicted
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showroom_types::session::{AddStep, SessionState};

    #[test]
    fn test_get_missing_is_none() {
        let store = InMemorySessionStore::new();
        assert!(store.get("1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_creates_and_mutates() {
        let store = InMemorySessionStore::new();
        let step = store.update("1", |s| {
            s.state = SessionState::Adding(AddStep::Name);
            s.state
        });
        assert_eq!(step, SessionState::Adding(AddStep::Name));
        assert_eq!(store.get("1").unwrap().state, step);
    }

    #[test]
    fn test_sessions_are_isolated_per_user() {
        let store = InMemorySessionStore::new();
        store.update("1", |s| s.draft.name = Some("Oslo".into()));
        store.update("2", |s| s.draft.name = Some("Milan".into()));
        assert_eq!(store.get("1").unwrap().draft.name.as_deref(), Some("Oslo"));
        assert_eq!(store.get("2").unwrap().draft.name.as_deref(), Some("Milan"));
        assert!(store.clear("1"));
        assert!(store.get("1").is_none());
        assert!(store.get("2").is_some());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = InMemorySessionStore::new();
        store.put("1", Session::default());
        assert!(store.clear("1"));
        assert!(!store.clear("1"));
    }

    #[test]
    fn test_put_stamps_touched_at() {
        let store = InMemorySessionStore::new();
        let stale = Session {
            touched_at: Utc::now() - Duration::hours(3),
            ..Default::default()
        };
        store.put("1", stale);
        let stored = store.get("1").unwrap();
        assert!(Utc::now() - stored.touched_at < Duration::minutes(1));
    }

    #[test]
    fn test_evict_idle_keeps_recent() {
        let store = InMemorySessionStore::new();
        store.put("fresh", Session::default());
        store.put("old", Session::default());
        store.sessions.alter("old", |_, mut s| {
            s.touched_at = Utc::now() - Duration::hours(2);
            s
        });
        assert_eq!(store.evict_idle(Duration::minutes(30)), 1);
        assert!(store.get("fresh").is_some());
        assert!(store.get("old").is_none());
    }
}
