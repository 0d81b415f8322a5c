//! Cache Metrics Module
//!
//! Tracks per-data-type hits, misses, saves, invalidations and remote loads,
//! plus rolling windows of load latencies.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

/// Maximum latency samples kept per window.
pub const MAX_LATENCY_SAMPLES: usize = 100;

// == Type Counters ==
/// Raw counters for one data type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounters {
    /// Loads answered from a valid cache entry
    pub hits: u64,
    /// Loads that found nothing usable
    pub misses: u64,
    /// Successful writes into storage
    pub saves: u64,
    /// Entries deleted by invalidation
    pub invalidations: u64,
    /// Payloads obtained from the remote store
    pub remote_loads: u64,
}

impl TypeCounters {
    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit percentage, 0.0 when no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        percentage(self.hits, self.total_requests())
    }

    /// Miss percentage, 0.0 when no requests have been made.
    pub fn miss_rate(&self) -> f64 {
        percentage(self.misses, self.total_requests())
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

// == Latency Window ==
/// Fixed-capacity FIFO of latency samples; the oldest sample is dropped on overflow.
#[derive(Debug, Clone)]
pub struct LatencyWindow {
    samples: VecDeque<u64>,
    capacity: usize,
}

impl LatencyWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, ms: u64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(ms);
    }

    /// Arithmetic mean, or None when empty.
    pub fn average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: u64 = self.samples.iter().sum();
        Some(sum as f64 / self.samples.len() as f64)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for LatencyWindow {
    fn default() -> Self {
        Self::new(MAX_LATENCY_SAMPLES)
    }
}

// == Report Types ==
/// Derived metrics for one data type.
#[derive(Debug, Clone, Serialize)]
pub struct TypeMetrics {
    #[serde(flatten)]
    pub counters: TypeCounters,
    pub total_requests: u64,
    /// Percentage in 0..=100
    pub hit_rate: f64,
    /// Percentage in 0..=100
    pub miss_rate: f64,
}

/// Per-type metrics plus latency averages.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub types: BTreeMap<String, TypeMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_cache_load_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_remote_load_time_ms: Option<f64>,
    pub uptime_ms: u64,
}

/// Session totals across every data type.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub total_hits: u64,
    pub total_misses: u64,
    pub total_invalidations: u64,
    pub total_saves: u64,
    pub total_remote_loads: u64,
    /// Percentage in 0..=100
    pub overall_hit_rate: f64,
    pub uptime_minutes: u64,
}

#[derive(Debug)]
struct MetricsState {
    per_type: BTreeMap<String, TypeCounters>,
    cache_load_times: LatencyWindow,
    remote_load_times: LatencyWindow,
    start_time: u64,
}

impl MetricsState {
    fn counters(&mut self, data_type: &str) -> &mut TypeCounters {
        self.per_type.entry(data_type.to_string()).or_default()
    }
}

// == Metrics Collector ==
/// Session-wide cache metrics.
///
/// Every recorder is a single counter or window update under one lock.
#[derive(Debug)]
pub struct MetricsCollector {
    state: Mutex<MetricsState>,
}

impl MetricsCollector {
    /// Creates a collector whose measurement window starts at `now_ms`.
    pub fn new(now_ms: u64) -> Self {
        Self {
            state: Mutex::new(MetricsState {
                per_type: BTreeMap::new(),
                cache_load_times: LatencyWindow::default(),
                remote_load_times: LatencyWindow::default(),
                start_time: now_ms,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MetricsState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record_hit(&self, data_type: &str) {
        self.lock().counters(data_type).hits += 1;
    }

    pub fn record_miss(&self, data_type: &str) {
        self.lock().counters(data_type).misses += 1;
    }

    pub fn record_save(&self, data_type: &str) {
        self.lock().counters(data_type).saves += 1;
    }

    pub fn record_invalidation(&self, data_type: &str) {
        self.lock().counters(data_type).invalidations += 1;
    }

    pub fn record_remote_load(&self, data_type: &str) {
        self.lock().counters(data_type).remote_loads += 1;
    }

    pub fn record_cache_load_time(&self, ms: u64) {
        self.lock().cache_load_times.push(ms);
    }

    pub fn record_remote_load_time(&self, ms: u64) {
        self.lock().remote_load_times.push(ms);
    }

    /// Raw counters for one data type (zeroed if never observed).
    pub fn counters(&self, data_type: &str) -> TypeCounters {
        self.lock()
            .per_type
            .get(data_type)
            .copied()
            .unwrap_or_default()
    }

    // == Snapshot ==
    /// Per-type rates and counters with latency averages.
    pub fn snapshot(&self, now_ms: u64) -> MetricsSnapshot {
        let state = self.lock();
        let types = state
            .per_type
            .iter()
            .map(|(name, counters)| {
                let metrics = TypeMetrics {
                    counters: *counters,
                    total_requests: counters.total_requests(),
                    hit_rate: counters.hit_rate(),
                    miss_rate: counters.miss_rate(),
                };
                (name.clone(), metrics)
            })
            .collect();

        MetricsSnapshot {
            types,
            average_cache_load_time_ms: state.cache_load_times.average(),
            average_remote_load_time_ms: state.remote_load_times.average(),
            uptime_ms: now_ms.saturating_sub(state.start_time),
        }
    }

    // == Summary ==
    /// Sums all per-type counters into session totals.
    pub fn summary(&self, now_ms: u64) -> MetricsSummary {
        let state = self.lock();
        let totals = state
            .per_type
            .values()
            .fold(TypeCounters::default(), |mut acc, c| {
                acc.hits += c.hits;
                acc.misses += c.misses;
                acc.saves += c.saves;
                acc.invalidations += c.invalidations;
                acc.remote_loads += c.remote_loads;
                acc
            });

        let uptime_ms = now_ms.saturating_sub(state.start_time);
        MetricsSummary {
            total_hits: totals.hits,
            total_misses: totals.misses,
            total_invalidations: totals.invalidations,
            total_saves: totals.saves,
            total_remote_loads: totals.remote_loads,
            overall_hit_rate: totals.hit_rate(),
            uptime_minutes: (uptime_ms + 30_000) / 60_000,
        }
    }

    // == Reset ==
    /// Zeroes every counter and window and restarts the measurement window.
    pub fn reset(&self, now_ms: u64) {
        let mut state = self.lock();
        state.per_type.clear();
        state.cache_load_times.clear();
        state.remote_load_times.clear();
        state.start_time = now_ms;
    }
}
