//! In-memory session storage backend.
//!
//! Sessions live in one process and are lost on restart. Lookup, promotion
//! to most-recently-used and tail eviction are all O(1); expiry sweeps cost
//! only as much as the number of expired sessions.
//!
//! The backend registers under the name `"memory"`. Call [`init`] once at
//! startup, before opening the store through the registry:
//!
//! ```rust,ignore
//! websess_memory::init()?;
//! let store = websess_core::registry::open("memory")?;
//! ```

mod session;
mod store;

pub use session::MemorySession;
pub use store::MemoryStore;

use std::sync::Arc;

use websess_core::{SessionStore, StoreError, registry};

/// Name this backend registers under.
pub const BACKEND_NAME: &str = "memory";

/// Register the memory backend factory.
///
/// # Errors
/// Returns [`StoreError::BackendExists`] if `"memory"` is already taken.
pub fn init() -> Result<(), StoreError> {
    registry::register(
        BACKEND_NAME,
        Arc::new(|| Arc::new(MemoryStore::new()) as Arc<dyn SessionStore>),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use websess_core::SessionExt;

    #[test]
    fn registry_round_trip() {
        // Another test may have registered the backend already.
        let _ = init();

        assert!(registry::backends().contains(&BACKEND_NAME.to_string()));

        let store = registry::open(BACKEND_NAME).expect("open memory backend");
        let sid = Uuid::new_v4().to_string();
        let session = store.read(&sid).expect("create session");
        session.set_value("user", &"alice").expect("set attribute");

        assert_eq!(session.get_value::<String>("user").as_deref(), Some("alice"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_registration_fails() {
        let _ = init();
        assert!(matches!(init(), Err(StoreError::BackendExists(_))));
    }

    #[test]
    fn registry_hands_out_independent_stores() {
        let _ = init();

        let a = registry::open(BACKEND_NAME).expect("open");
        let b = registry::open(BACKEND_NAME).expect("open");

        a.read("only-in-a").expect("create");
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
    }
}
