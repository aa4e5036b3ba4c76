//! Core contracts for websess session management.
//!
//! This crate provides the fundamental building blocks:
//! - `Session` / `SessionStore` - the storage contract backends implement
//! - `TouchSink` - narrow capability for recency notifications
//! - `registry` - process-wide backend selection by name
//! - `Sweeper` - periodic expiry driver

pub mod registry;
pub mod sweeper;
pub mod traits;

pub use sweeper::Sweeper;
pub use traits::{Session, SessionExt, SessionStore, StoreError, TouchSink};
