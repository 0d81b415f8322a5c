//! Fleet Cache - local caching layer for fleet ERP reference data
//!
//! Remote-first reads with an expiring local cache as fallback, per-type
//! metrics, periodic sweeping and live invalidation from remote changes.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod listeners;
pub mod models;
pub mod remote;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::CacheService;
pub use config::Config;
pub use listeners::{spawn_listener_task, LiveInvalidation};
pub use tasks::spawn_sweeper_task;
