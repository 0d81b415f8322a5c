//! Cache Module
//!
//! Remote-first local cache with TTL expiry and hit/miss accounting.

mod entry;
mod fetch;
mod metrics;
mod service;
mod store;
mod ttl;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use fetch::{is_usable_payload, PayloadShape};
pub use metrics::{
    LatencyWindow, MetricsCollector, MetricsSnapshot, MetricsSummary, TypeCounters, TypeMetrics,
    MAX_LATENCY_SAMPLES,
};
pub use service::{CacheMetricsReport, CacheService, CacheStats};
pub use store::{
    CacheStore, EntryStatus, InvalidateScope, StorageOverview, ALL_SCOPE, DEFAULT_CACHE_PREFIX,
};
pub use ttl::{TtlPolicy, DEFAULT_TTL_MS};
