//! Session registry - live check-in sessions keyed by id.
//!
//! Concurrent requests for different sessions proceed in parallel; every
//! mutation of a single session happens under the write lock, so two
//! requests for the same session are applied one after the other.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::checkin::CheckinSession;
use crate::domain::foundation::{SessionId, Timestamp};

#[derive(Debug)]
struct Entry {
    session: CheckinSession,
    last_activity: Timestamp,
}

/// In-memory registry of live sessions with per-entry activity tracking.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Entry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session under a fresh id.
    pub async fn insert(&self, session: CheckinSession) -> SessionId {
        let id = SessionId::new();
        let entry = Entry {
            session,
            last_activity: Timestamp::now(),
        };
        self.sessions.write().await.insert(id, entry);
        id
    }

    /// Applies `f` to a session and marks it active.
    ///
    /// Returns `None` if the id is unknown.
    pub async fn update<R>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut CheckinSession) -> R,
    ) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_activity = Timestamp::now();
        Some(f(&mut entry.session))
    }

    /// Reads a session without touching its activity time.
    pub async fn read<R>(&self, id: &SessionId, f: impl FnOnce(&CheckinSession) -> R) -> Option<R> {
        let sessions = self.sessions.read().await;
        sessions.get(id).map(|entry| f(&entry.session))
    }

    /// Runs `f` on a session and removes it when `f` returns `Ok`.
    ///
    /// The check and the removal happen under one lock, so at most one
    /// caller can take a given session.
    pub async fn remove_if<T, E>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&CheckinSession) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        let mut sessions = self.sessions.write().await;
        let result = f(&sessions.get(id)?.session);
        if result.is_ok() {
            sessions.remove(id);
        }
        Some(result)
    }

    /// Removes a session. Returns whether it existed.
    pub async fn remove(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Removes sessions idle for longer than `ttl`.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        self.evict_idle_before(Timestamp::now().minus_secs(ttl.as_secs()))
            .await
    }

    /// Removes sessions whose last activity is before `cutoff`.
    pub async fn evict_idle_before(&self, cutoff: Timestamp) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.last_activity.is_before(&cutoff));
        before - sessions.len()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
