//! In-memory session store.
//!
//! The map lock is only held for lookups and insertions, never across an
//! `.await`. Each [`Session`] carries its own async mutex around its
//! [`History`], so work on one session never blocks another.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::history::History;

// ─────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────

/// One independent conversation.
pub struct Session {
    id: String,
    history: Mutex<History>,
    created_at: DateTime<Utc>,
    /// Unix millis of the last `get_or_create` hit.
    last_active: AtomicI64,
}

impl Session {
    fn new(id: &str) -> Self {
        let now = Utc::now();
        Session {
            id: id.to_string(),
            history: Mutex::new(History::new()),
            created_at: now,
            last_active: AtomicI64::new(now.timestamp_millis()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Lock this session's history for a read-modify-append sequence.
    pub async fn lock_history(&self) -> MutexGuard<'_, History> {
        self.history.lock().await
    }

    /// Milliseconds since the session was last resolved through the store.
    pub fn idle_millis(&self) -> i64 {
        Utc::now().timestamp_millis() - self.last_active.load(Ordering::Relaxed)
    }

    fn touch(&self) {
        self.last_active
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Whether a caller currently holds the history lock.
    fn is_busy(&self) -> bool {
        self.history.try_lock().is_err()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .finish()
    }
}

// ─────────────────────────────────────────────
// SessionStore
// ─────────────────────────────────────────────

/// Maps session ids to sessions. At most one [`Session`] exists per id.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session for `id`, creating an empty one if it is unseen.
    ///
    /// Creation happens under the write lock with an entry lookup, so callers
    /// racing on the same unseen id all receive the same `Arc`.
    pub fn get_or_create(&self, id: &str) -> Arc<Session> {
        {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(session) = sessions.get(id) {
                session.touch();
                return session.clone();
            }
        }

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let session = sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                debug!(session = %id, "created session");
                Arc::new(Session::new(id))
            })
            .clone();
        session.touch();
        session
    }

    /// Look up a session without creating it.
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.get(id).cloned()
    }

    /// Remove a session. Returns `true` if it existed; absent ids are a no-op.
    ///
    /// A request already holding the removed session finishes against it;
    /// the next `get_or_create` for the same id starts fresh.
    pub fn delete(&self, id: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some();
        if removed {
            debug!(session = %id, "deleted session");
        }
        removed
    }

    /// Snapshot of all known session ids, sorted.
    pub fn list_ids(&self) -> Vec<String> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove sessions idle for at least `ttl`. Sessions whose history is
    /// locked by an in-flight request are skipped.
    ///
    /// Returns the number of sessions evicted.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|id, session| {
            let keep = session.is_busy() || session.idle_millis() < ttl_ms;
            if !keep {
                debug!(
                    session = %id,
                    idle_ms = session.idle_millis(),
                    age_s = (Utc::now() - session.created_at()).num_seconds(),
                    "evicting idle session"
                );
            }
            keep
        });
        before - sessions.len()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
