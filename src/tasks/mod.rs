//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the cache is live.
//!
//! # Tasks
//! - Sweeper: evicts expired cache entries once at startup, then on an interval

mod sweeper;

pub use sweeper::spawn_sweeper_task;
