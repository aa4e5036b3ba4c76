//! The per-identity session object held by the memory store.

use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard, Weak,
        atomic::{AtomicI64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

use serde_json::Value;
use tracing::trace;
use websess_core::{Session, StoreError, TouchSink};

/// Current Unix time in seconds.
pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// A session held by [`MemoryStore`](crate::MemoryStore).
///
/// The attribute bag carries its own mutex, so concurrent access to one
/// session from several request handlers is safe. `last_accessed` is atomic:
/// the store's sweep reads it without taking the session lock, which keeps
/// the store lock and session locks from ever being held together.
pub struct MemorySession {
    sid: String,
    last_accessed: AtomicI64,
    attributes: Mutex<HashMap<String, Value>>,
    store: Weak<dyn TouchSink>,
}

impl MemorySession {
    pub(crate) fn new(sid: &str, store: Weak<dyn TouchSink>) -> Self {
        Self {
            sid: sid.to_string(),
            last_accessed: AtomicI64::new(unix_now()),
            attributes: Mutex::new(HashMap::new()),
            store,
        }
    }

    /// Unix-seconds timestamp of the most recent attribute access.
    pub fn last_accessed(&self) -> i64 {
        self.last_accessed.load(Ordering::Acquire)
    }

    /// Refresh `last_accessed` and ask the store to promote this session.
    ///
    /// `fetch_max` keeps the timestamp monotonically non-decreasing even
    /// when touches race.
    fn touch(&self) -> Result<(), StoreError> {
        self.last_accessed.fetch_max(unix_now(), Ordering::AcqRel);
        match self.store.upgrade() {
            Some(store) => store.touched(&self.sid),
            // Store already gone; nothing left to promote into.
            None => Ok(()),
        }
    }

    fn bag(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        // A poisoned bag means a panic mid-mutation; the contents can no
        // longer be trusted.
        self.attributes.lock().expect("session attribute bag poisoned")
    }

    #[cfg(test)]
    pub(crate) fn set_last_accessed(&self, ts: i64) {
        self.last_accessed.store(ts, Ordering::Release);
    }
}

impl Session for MemorySession {
    fn id(&self) -> &str {
        &self.sid
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.bag().insert(key.to_string(), value);
        trace!(sid = %self.sid, key, "session attribute set");
        self.touch()
    }

    fn get(&self, key: &str) -> Option<Value> {
        let value = self.bag().get(key).cloned()?;
        // Only a hit counts as an access.
        let _ = self.touch();
        Some(value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.bag().remove(key);
        self.touch()
    }
}
