//! Example wiring of the session framework.
//!
//! Registers the memory backend, opens it through the registry, exercises
//! the session surface and lets the sweeper evict the session again.
//!
//! Run with: cargo run -p session-demo

use std::{sync::Arc, time::Duration};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use websess_core::{SessionExt, Sweeper, registry};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    // Backends register explicitly at startup; selection happens by name.
    websess_memory::init().expect("register memory backend");
    tracing::info!(backends = ?registry::backends(), "registry populated");

    let store = registry::open("memory").expect("open memory backend");

    // Session IDs come from the transport layer; a UUID stands in here.
    let sid = Uuid::new_v4().to_string();
    let session = store.read(&sid).expect("create session");
    session.set_value("role", &"admin").expect("set role");
    session
        .set("visits", serde_json::json!(1))
        .expect("set visits");

    let role: Option<String> = session.get_value("role");
    tracing::info!(%sid, ?role, live = store.len(), "session populated");

    // The store never sweeps itself; this periodic task is the trigger.
    let sweeper = Sweeper::spawn(
        Arc::clone(&store),
        Duration::from_secs(2),
        Duration::from_millis(500),
    );

    tokio::time::sleep(Duration::from_secs(3)).await;
    tracing::info!(live = store.len(), "after idle lifetime elapsed");

    sweeper.shutdown();
}
