//! Process-wide registry of session storage backends.
//!
//! The session manager above selects a backend by configured name. Backends
//! register a factory explicitly at startup (no load-time side effects), so
//! initialization order is visible in `main`.

use std::{
    collections::HashMap,
    sync::{Arc, OnceLock, RwLock},
};

use crate::traits::{SessionStore, StoreError};

/// Constructor for a fresh store instance.
pub type StoreFactory = Arc<dyn Fn() -> Arc<dyn SessionStore> + Send + Sync>;

fn registry() -> &'static RwLock<HashMap<String, StoreFactory>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, StoreFactory>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register a backend factory under `name`.
///
/// # Errors
/// Returns [`StoreError::BackendExists`] if the name is already taken;
/// re-registration is never silent.
pub fn register(name: &str, factory: StoreFactory) -> Result<(), StoreError> {
    let mut backends = registry().write().expect("backend registry poisoned");
    if backends.contains_key(name) {
        return Err(StoreError::BackendExists(name.to_string()));
    }
    backends.insert(name.to_string(), factory);
    tracing::debug!(backend = %name, "session backend registered");
    Ok(())
}

/// Construct a fresh store from the backend registered under `name`.
///
/// # Errors
/// Returns [`StoreError::UnknownBackend`] if no factory is registered.
pub fn open(name: &str) -> Result<Arc<dyn SessionStore>, StoreError> {
    let backends = registry().read().expect("backend registry poisoned");
    let factory = backends
        .get(name)
        .ok_or_else(|| StoreError::UnknownBackend(name.to_string()))?;
    Ok(factory())
}

/// Names of all registered backends, sorted for stable output.
#[must_use]
pub fn backends() -> Vec<String> {
    let mut names: Vec<String> = registry()
        .read()
        .expect("backend registry poisoned")
        .keys()
        .cloned()
        .collect();
    names.sort();
    names
}
