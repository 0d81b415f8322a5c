//! Cache Service Module
//!
//! Explicitly constructed owner of the cache store and its metrics. This is
//! the surface the rest of the application talks to.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::cache::{
    CacheStore, InvalidateScope, MetricsCollector, MetricsSnapshot, MetricsSummary,
    StorageOverview, TtlPolicy, DEFAULT_CACHE_PREFIX,
};
use crate::clock::Clock;
use crate::config::Config;
use crate::storage::StorageBackend;

// == Reports ==
/// Storage view plus per-type metrics.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    #[serde(flatten)]
    pub storage: StorageOverview,
    pub metrics: MetricsSnapshot,
}

/// `CacheStats` with session totals.
#[derive(Debug, Clone, Serialize)]
pub struct CacheMetricsReport {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub summary: MetricsSummary,
}

// == Cache Service ==
pub struct CacheService {
    clock: Arc<dyn Clock>,
    metrics: Arc<MetricsCollector>,
    store: CacheStore,
}

impl CacheService {
    // == Constructor ==
    /// Service with the default TTL table and key prefix.
    pub fn new(clock: Arc<dyn Clock>, storage: Arc<dyn StorageBackend>) -> Self {
        Self::with_options(clock, storage, TtlPolicy::default(), DEFAULT_CACHE_PREFIX)
    }

    pub fn with_options(
        clock: Arc<dyn Clock>,
        storage: Arc<dyn StorageBackend>,
        ttl: TtlPolicy,
        prefix: impl Into<String>,
    ) -> Self {
        let metrics = Arc::new(MetricsCollector::new(clock.now_ms()));
        let store = CacheStore::new(storage, clock.clone(), metrics.clone(), ttl, prefix);
        Self {
            clock,
            metrics,
            store,
        }
    }

    /// Service configured from `config` (default TTL and key prefix).
    pub fn from_config(
        config: &Config,
        clock: Arc<dyn Clock>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self::with_options(
            clock,
            storage,
            TtlPolicy::new(config.default_ttl_ms),
            config.cache_prefix.clone(),
        )
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn save_to_cache(&self, data_type: &str, payload: &Value) -> bool {
        self.store.save(data_type, payload)
    }

    pub fn get_from_cache(&self, data_type: &str) -> Option<Value> {
        self.store.load(data_type)
    }

    /// Deletes one data type, or everything when given `"all"`.
    pub fn invalidate_cache(&self, scope: impl Into<InvalidateScope>) -> usize {
        self.store.invalidate(scope)
    }

    pub fn is_cache_valid(&self, data_type: &str) -> bool {
        self.store.is_valid(data_type)
    }

    /// Evicts every expired entry; returns how many were removed.
    pub fn clean_expired_cache(&self) -> usize {
        let evicted = self.store.sweep();
        if evicted > 0 {
            info!(evicted, "Expired cache entries cleaned");
        }
        evicted
    }

    /// Wipes every cache entry, for when data was intentionally cleared.
    pub fn clear_all_cache(&self) -> usize {
        self.store.invalidate(InvalidateScope::All)
    }

    // == Stats ==
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            storage: self.store.overview(),
            metrics: self.metrics.snapshot(self.clock.now_ms()),
        }
    }

    pub fn cache_metrics(&self) -> CacheMetricsReport {
        CacheMetricsReport {
            stats: self.cache_stats(),
            summary: self.metrics.summary(self.clock.now_ms()),
        }
    }

    /// Zeroes metrics; cached entries are kept.
    pub fn reset_cache_metrics(&self) {
        self.metrics.reset(self.clock.now_ms());
        info!("Cache metrics reset");
    }

    /// Writes a readable metrics report to the log and returns it.
    pub fn log_cache_metrics(&self) -> CacheMetricsReport {
        let report = self.cache_metrics();
        let summary = &report.summary;
        info!(
            uptime_minutes = summary.uptime_minutes,
            hits = summary.total_hits,
            misses = summary.total_misses,
            hit_rate = %format!("{:.2}%", summary.overall_hit_rate),
            invalidations = summary.total_invalidations,
            saves = summary.total_saves,
            remote_loads = summary.total_remote_loads,
            avg_cache_ms = report.stats.metrics.average_cache_load_time_ms,
            avg_remote_ms = report.stats.metrics.average_remote_load_time_ms,
            size_kb = report.stats.storage.total_size_kb,
            "Cache metrics summary"
        );

        for (data_type, metrics) in &report.stats.metrics.types {
            let entry = report.stats.storage.types.get(data_type);
            info!(
                data_type = %data_type,
                hits = metrics.counters.hits,
                misses = metrics.counters.misses,
                requests = metrics.total_requests,
                hit_rate = %format!("{:.2}%", metrics.hit_rate),
                invalidations = metrics.counters.invalidations,
                saves = metrics.counters.saves,
                remote_loads = metrics.counters.remote_loads,
                size_kb = entry.map(|e| e.size_kb),
                valid = entry.map(|e| e.valid),
                "Cache metrics by data type"
            );
        }

        report
    }
}
