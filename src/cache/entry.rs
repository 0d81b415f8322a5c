//! Cache Entry Module
//!
//! Defines the persisted record for one data type, with TTL support.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// One cached payload as it is written to storage.
///
/// Serialized as `{"data", "timestamp", "ttl", "type"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached payload, opaque to the cache
    #[serde(rename = "data")]
    pub payload: Value,
    /// Write timestamp (Unix milliseconds)
    #[serde(rename = "timestamp")]
    pub written_at: u64,
    /// Validity duration in milliseconds
    #[serde(rename = "ttl")]
    pub ttl_ms: u64,
    /// Logical data type this entry belongs to
    #[serde(rename = "type")]
    pub data_type: String,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry written at `now_ms`.
    pub fn new(data_type: impl Into<String>, payload: Value, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            payload,
            written_at: now_ms,
            ttl_ms,
            data_type: data_type.into(),
        }
    }

    /// Milliseconds since the entry was written. A timestamp in the future reads as 0.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.written_at)
    }

    // == Is Valid ==
    /// Checks freshness.
    ///
    /// Boundary condition: the entry stops being valid the moment its age
    /// reaches the TTL, so `age == ttl` is already expired.
    pub fn is_valid(&self, now_ms: u64) -> bool {
        self.age_ms(now_ms) < self.ttl_ms
    }

    /// Remaining validity in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.ttl_ms.saturating_sub(self.age_ms(now_ms))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_valid_before_ttl() {
        let entry = CacheEntry::new("clients", json!([{"id": 1}]), 0, 300_000);
        assert!(entry.is_valid(0));
        assert!(entry.is_valid(299_999));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("clients", json!([1]), 1_000, 500);
        assert!(!entry.is_valid(1_500), "Entry should be expired at boundary");
        assert!(!entry.is_valid(10_000));
    }

    #[test]
    fn test_future_timestamp_counts_as_fresh() {
        let entry = CacheEntry::new("clients", json!([1]), 5_000, 100);
        assert_eq!(entry.age_ms(1_000), 0);
        assert!(entry.is_valid(1_000));
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new("clients", json!([1]), 0, 1_000);
        assert_eq!(entry.ttl_remaining_ms(400), 600);
        assert_eq!(entry.ttl_remaining_ms(5_000), 0);
    }

    #[test]
    fn test_persisted_layout() {
        let entry = CacheEntry::new("vehicles", json!({"a": 1}), 10, 20);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({"data": {"a": 1}, "timestamp": 10, "ttl": 20, "type": "vehicles"})
        );
    }
}
