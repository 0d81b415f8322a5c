//! Cache Store Module
//!
//! Expiring cache engine: one namespaced storage key per data type, each
//! holding a serialized `CacheEntry`. Reports hits, misses, saves and
//! invalidations to the metrics collector.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, MetricsCollector, TtlPolicy};
use crate::clock::Clock;
use crate::error::{CacheError, Result};
use crate::storage::StorageBackend;

/// Default storage key prefix for cache entries.
pub const DEFAULT_CACHE_PREFIX: &str = "erp_cache_";

/// Scope name that targets every cache entry.
pub const ALL_SCOPE: &str = "all";

// == Invalidate Scope ==
/// What an invalidation removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidateScope {
    /// Every entry under the cache prefix
    All,
    /// A single data type
    Type(String),
}

impl From<&str> for InvalidateScope {
    fn from(value: &str) -> Self {
        if value == ALL_SCOPE {
            InvalidateScope::All
        } else {
            InvalidateScope::Type(value.to_string())
        }
    }
}

impl From<String> for InvalidateScope {
    fn from(value: String) -> Self {
        InvalidateScope::from(value.as_str())
    }
}

// == Storage Overview ==
/// Freshness and size of one stored entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryStatus {
    pub valid: bool,
    pub key: String,
    pub size_kb: f64,
}

/// What is currently held in storage under the cache prefix.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageOverview {
    pub total: usize,
    pub valid: usize,
    pub expired: usize,
    pub types: BTreeMap<String, EntryStatus>,
    pub total_size_kb: f64,
}

// == Cache Store ==
/// TTL-bounded cache over a local storage backend.
pub struct CacheStore {
    storage: Arc<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    metrics: Arc<MetricsCollector>,
    ttl: TtlPolicy,
    prefix: String,
}

impl CacheStore {
    // == Constructor ==
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        clock: Arc<dyn Clock>,
        metrics: Arc<MetricsCollector>,
        ttl: TtlPolicy,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            clock,
            metrics,
            ttl,
            prefix: prefix.into(),
        }
    }

    /// Storage key holding `data_type`.
    pub fn key_for(&self, data_type: &str) -> String {
        format!("{}{}", self.prefix, data_type)
    }

    pub fn ttl_ms(&self, data_type: &str) -> u64 {
        self.ttl.ttl_ms(data_type)
    }

    // == Save ==
    /// Stores `payload` for `data_type`, stamped with the current time and TTL.
    ///
    /// Returns false if serialization or the storage write fails.
    pub fn save(&self, data_type: &str, payload: &Value) -> bool {
        match self.try_save(data_type, payload) {
            Ok(()) => {
                self.metrics.record_save(data_type);
                debug!(
                    data_type,
                    items = payload.as_array().map(Vec::len),
                    "Saved payload to cache"
                );
                true
            }
            Err(e) => {
                warn!(data_type, error = %e, "Failed to save payload to cache");
                false
            }
        }
    }

    fn try_save(&self, data_type: &str, payload: &Value) -> Result<()> {
        let entry = CacheEntry::new(
            data_type,
            payload.clone(),
            self.clock.now_ms(),
            self.ttl.ttl_ms(data_type),
        );
        let serialized = serde_json::to_string(&entry)?;
        self.storage.set_item(&self.key_for(data_type), &serialized)?;
        Ok(())
    }

    // == Load ==
    /// Returns the cached payload if present and still valid.
    ///
    /// Expired and corrupt entries are deleted. Every call records exactly
    /// one hit or one miss.
    pub fn load(&self, data_type: &str) -> Option<Value> {
        let started = self.clock.now_ms();

        match self.read_entry(data_type) {
            Ok(Some(entry)) => {
                let now = self.clock.now_ms();
                if entry.is_valid(now) {
                    self.metrics.record_hit(data_type);
                    self.metrics.record_cache_load_time(now.saturating_sub(started));
                    debug!(
                        data_type,
                        remaining_ms = entry.ttl_remaining_ms(now),
                        "Cache hit"
                    );
                    Some(entry.payload)
                } else {
                    debug!(
                        data_type,
                        age_ms = entry.age_ms(now),
                        ttl_ms = entry.ttl_ms,
                        "Cache entry expired"
                    );
                    self.discard(data_type);
                    self.metrics.record_miss(data_type);
                    None
                }
            }
            Ok(None) => {
                self.metrics.record_miss(data_type);
                None
            }
            Err(e) => {
                warn!(data_type, error = %e, "Failed to read cache entry, discarding it");
                self.discard(data_type);
                self.metrics.record_miss(data_type);
                None
            }
        }
    }

    fn read_entry(&self, data_type: &str) -> Result<Option<CacheEntry>> {
        let Some(raw) = self.storage.get_item(&self.key_for(data_type))? else {
            return Ok(None);
        };
        let entry = serde_json::from_str(&raw).map_err(|source| CacheError::CorruptEntry {
            data_type: data_type.to_string(),
            source,
        })?;
        Ok(Some(entry))
    }

    /// Removes an entry without counting it as an invalidation.
    fn discard(&self, data_type: &str) {
        if let Err(e) = self.storage.remove_item(&self.key_for(data_type)) {
            warn!(data_type, error = %e, "Failed to remove cache entry");
        }
    }

    // == Is Valid ==
    /// Freshness check without returning the payload, mutating storage or
    /// touching metrics.
    pub fn is_valid(&self, data_type: &str) -> bool {
        matches!(
            self.read_entry(data_type),
            Ok(Some(entry)) if entry.is_valid(self.clock.now_ms())
        )
    }

    // == Invalidate ==
    /// Deletes one entry or every entry under the prefix.
    ///
    /// Returns the number of entries deleted; each one is recorded as an
    /// invalidation. Storage keys outside the prefix are left alone.
    pub fn invalidate(&self, scope: impl Into<InvalidateScope>) -> usize {
        match scope.into() {
            InvalidateScope::Type(data_type) => {
                let removed = self.remove_entry(&data_type);
                if removed {
                    info!(data_type = %data_type, "Cache invalidated");
                }
                usize::from(removed)
            }
            InvalidateScope::All => {
                let removed = self
                    .cached_types()
                    .iter()
                    .filter(|data_type| self.remove_entry(data_type))
                    .count();
                info!(removed, "Cache invalidated for all data types");
                removed
            }
        }
    }

    fn remove_entry(&self, data_type: &str) -> bool {
        let key = self.key_for(data_type);
        let result = self.storage.get_item(&key).and_then(|existing| {
            if existing.is_some() {
                self.storage.remove_item(&key)?;
            }
            Ok(existing.is_some())
        });

        match result {
            Ok(true) => {
                self.metrics.record_invalidation(data_type);
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!(data_type, error = %e, "Failed to invalidate cache entry");
                false
            }
        }
    }

    /// Data types that currently have an entry in storage, sorted.
    pub fn cached_types(&self) -> Vec<String> {
        match self.storage.keys() {
            Ok(keys) => {
                let mut types: Vec<String> = keys
                    .iter()
                    .filter_map(|key| key.strip_prefix(&self.prefix))
                    .map(str::to_string)
                    .collect();
                types.sort();
                types
            }
            Err(e) => {
                warn!(error = %e, "Failed to list storage keys");
                Vec::new()
            }
        }
    }

    // == Sweep ==
    /// Invalidates every entry that is no longer valid.
    ///
    /// Returns the number of entries evicted.
    pub fn sweep(&self) -> usize {
        self.cached_types()
            .into_iter()
            .filter(|data_type| !self.is_valid(data_type))
            .map(|data_type| self.invalidate(InvalidateScope::Type(data_type)))
            .sum()
    }

    // == Overview ==
    /// Counts and sizes of the entries currently in storage.
    pub fn overview(&self) -> StorageOverview {
        let mut overview = StorageOverview::default();

        for data_type in self.cached_types() {
            let key = self.key_for(&data_type);
            let valid = self.is_valid(&data_type);
            let size_bytes = match self.storage.get_item(&key) {
                Ok(raw) => raw.map(|s| s.len()).unwrap_or(0),
                Err(_) => 0,
            };
            let size_kb = round2(size_bytes as f64 / 1024.0);

            overview.total += 1;
            if valid {
                overview.valid += 1;
            } else {
                overview.expired += 1;
            }
            overview.total_size_kb += size_kb;
            overview.types.insert(data_type, EntryStatus { valid, key, size_kb });
        }

        overview.total_size_kb = round2(overview.total_size_kb);
        overview
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
