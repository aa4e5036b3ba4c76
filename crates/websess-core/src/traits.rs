//! Core traits for sessions and their storage backends.

use std::{sync::Arc, time::Duration};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

/// Storage error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No backend registered under name: {0}")]
    UnknownBackend(String),
    #[error("Backend already registered: {0}")]
    BackendExists(String),
    #[error("Attribute serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Store error: {0}")]
    Internal(String),
}

/// A live session: a key/value attribute bag tied to one identifier.
///
/// Every attribute access (write, successful read, delete) counts as a use of
/// the session and refreshes its recency in the owning store. Recency is the
/// only signal expiry sweeps act on; there is no per-session TTL field.
pub trait Session: Send + Sync {
    /// The session identifier. Pure accessor, no recency side effect.
    fn id(&self) -> &str;

    /// Insert or overwrite an attribute, refreshing recency.
    ///
    /// # Errors
    /// Propagates a promotion failure from the owning store. The memory
    /// backend never produces one; the signature stays fallible so a
    /// capacity-limited backend can fit the same contract.
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Fetch an attribute. A hit refreshes recency; a miss does not.
    fn get(&self, key: &str) -> Option<Value>;

    /// Remove an attribute and refresh recency. Removing an absent key is a
    /// no-op, not an error.
    ///
    /// # Errors
    /// Same contract as [`Session::set`].
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Typed attribute access layered over the JSON bag.
pub trait SessionExt: Session {
    /// Serialize `value` and store it under `key`.
    ///
    /// # Errors
    /// Returns [`StoreError::Serialize`] if the value cannot be represented
    /// as JSON, otherwise the same contract as [`Session::set`].
    fn set_value<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.set(key, serde_json::to_value(value)?)
    }

    /// Fetch and deserialize the attribute under `key`.
    ///
    /// Returns `None` both when the key is absent and when the stored value
    /// does not deserialize to `T`.
    fn get_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|v| serde_json::from_value(v).ok())
    }
}

impl<S: Session + ?Sized> SessionExt for S {}

/// Trait for session storage backends.
///
/// The store owns the session population, indexed by identifier for O(1)
/// lookup and ordered by recency for expiry. Implementations must keep index
/// and recency order mutually consistent under concurrent calls.
pub trait SessionStore: Send + Sync {
    /// Allocate a fresh session under `sid`: current timestamp, empty
    /// attribute bag, inserted at the most-recently-used end.
    ///
    /// Creating over an existing identifier replaces the old session;
    /// callers that need get-or-create semantics go through
    /// [`SessionStore::read`].
    ///
    /// # Errors
    /// Backend-specific; the memory backend never fails.
    fn create(&self, sid: &str) -> Result<Arc<dyn Session>, StoreError>;

    /// Return the session under `sid`, creating it if absent.
    ///
    /// A bare lookup does not promote; only attribute access does. Hit and
    /// miss are indistinguishable through the return value, which the
    /// session manager above relies on. Use [`SessionStore::get`] when a
    /// miss must be observable.
    ///
    /// # Errors
    /// Backend-specific; the memory backend never fails.
    fn read(&self, sid: &str) -> Result<Arc<dyn Session>, StoreError>;

    /// Look up `sid` without creating or promoting.
    fn get(&self, sid: &str) -> Option<Arc<dyn Session>>;

    /// Remove `sid` from the index and the recency order. Idempotent; an
    /// absent identifier is not an error.
    fn destroy(&self, sid: &str);

    /// Evict every session whose last access is older than `max_lifetime`,
    /// walking from the least-recently-used end and stopping at the first
    /// entry still within its lifetime. Returns the number evicted.
    ///
    /// Cost is proportional to the number of expired entries, not the
    /// population size.
    fn collect_expired(&self, max_lifetime: Duration) -> usize;

    /// Number of live sessions.
    fn len(&self) -> usize;

    /// Whether the store holds no sessions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Narrow capability a session uses to tell its store it was touched.
///
/// Sessions hold this instead of a full store handle so the back-reference
/// cannot reach store internals.
pub trait TouchSink: Send + Sync {
    /// Move `sid` to the most-recently-used end of the store's ordering.
    ///
    /// An unknown identifier is a no-op: a destroy can legitimately race an
    /// in-flight attribute access.
    ///
    /// # Errors
    /// Backend-specific; the memory backend never fails.
    fn touched(&self, sid: &str) -> Result<(), StoreError>;
}
