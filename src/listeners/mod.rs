//! Live Invalidation Module
//!
//! Subscribes to remote change notifications for a fixed set of data types
//! and invalidates the matching cache entry on every change. The cache is
//! never refreshed here; the next fetch repopulates it.

mod registry;
mod targets;

pub use registry::{spawn_listener_task, ListenerConfig, ListenerState, LiveInvalidation};
pub use targets::{default_targets, document_path_for, ListenerTarget, CONFIGURATION_COLLECTION};
