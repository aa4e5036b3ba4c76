//! Memory-backed session store: one structure for index and recency order.

use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

use lru::LruCache;
use tracing::{debug, trace};
use websess_core::{Session, SessionStore, StoreError, TouchSink};

use crate::session::{MemorySession, unix_now};

/// In-memory session store.
///
/// A single [`LruCache`] is both the identifier index and the recency order:
/// lookup, insert-at-front, move-to-front and tail removal are all O(1), and
/// the two views cannot drift apart. Every structural mutation happens under
/// one mutex; sessions' attribute bags are never locked while it is held.
///
/// Capacity is unbounded. Sessions leave only through
/// [`destroy`](SessionStore::destroy) or
/// [`collect_expired`](SessionStore::collect_expired).
pub struct MemoryStore {
    inner: Arc<Shared>,
}

struct Shared {
    // MRU at the front, expiry candidates at the back.
    sessions: Mutex<LruCache<String, Arc<MemorySession>>>,
}

impl Shared {
    fn sessions(&self) -> MutexGuard<'_, LruCache<String, Arc<MemorySession>>> {
        // Poisoning means a panic happened mid-mutation and index and order
        // can no longer be trusted together; fail loudly.
        self.sessions.lock().expect("session store lock poisoned")
    }
}

impl TouchSink for Shared {
    fn touched(&self, sid: &str) -> Result<(), StoreError> {
        // A destroy can race an in-flight attribute access; a missing id is
        // normal here, not an error.
        self.sessions().promote(sid);
        trace!(%sid, "session promoted");
        Ok(())
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Shared {
                sessions: Mutex::new(LruCache::unbounded()),
            }),
        }
    }

    fn new_session(&self, sid: &str) -> Arc<MemorySession> {
        let sink: Weak<Shared> = Arc::downgrade(&self.inner);
        Arc::new(MemorySession::new(sid, sink))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SessionStore for MemoryStore {
    fn create(&self, sid: &str) -> Result<Arc<dyn Session>, StoreError> {
        let session = self.new_session(sid);
        // `put` lands the entry at the MRU end and replaces any session
        // already under this id.
        self.inner
            .sessions()
            .put(sid.to_string(), Arc::clone(&session));
        trace!(%sid, "session created");
        Ok(session)
    }

    fn read(&self, sid: &str) -> Result<Arc<dyn Session>, StoreError> {
        let mut sessions = self.inner.sessions();
        if let Some(existing) = sessions.peek(sid) {
            // Bare lookup: no promotion until an attribute access happens.
            return Ok(Arc::clone(existing) as Arc<dyn Session>);
        }
        let session = self.new_session(sid);
        sessions.put(sid.to_string(), Arc::clone(&session));
        trace!(%sid, "session created on read miss");
        Ok(session)
    }

    fn get(&self, sid: &str) -> Option<Arc<dyn Session>> {
        self.inner
            .sessions()
            .peek(sid)
            .map(|s| Arc::clone(s) as Arc<dyn Session>)
    }

    fn destroy(&self, sid: &str) {
        if self.inner.sessions().pop(sid).is_some() {
            debug!(%sid, "session destroyed");
        }
    }

    fn collect_expired(&self, max_lifetime: Duration) -> usize {
        let lifetime = i64::try_from(max_lifetime.as_secs()).unwrap_or(i64::MAX);
        let cutoff = unix_now().saturating_sub(lifetime);

        let mut sessions = self.inner.sessions();
        let mut evicted = 0;
        while let Some((_, oldest)) = sessions.peek_lru() {
            if oldest.last_accessed() >= cutoff {
                // Everything in front of this entry is even more recent.
                break;
            }
            if let Some((sid, _)) = sessions.pop_lru() {
                debug!(%sid, "expired session evicted");
                evicted += 1;
            }
        }
        evicted
    }

    fn len(&self) -> usize {
        self.inner.sessions().len()
    }
}
