//! TTL Policy Module
//!
//! Static per-data-type time-to-live table with a default fallback.

const MINUTE_MS: u64 = 60 * 1000;

/// Fallback TTL for data types missing from the table (5 minutes).
pub const DEFAULT_TTL_MS: u64 = 5 * MINUTE_MS;

/// Known data types and their TTLs.
const TTL_TABLE: &[(&str, u64)] = &[
    ("clients", 5 * MINUTE_MS),
    ("vehicles", 5 * MINUTE_MS),
    ("operators", 5 * MINUTE_MS),
    ("stays", 5 * MINUTE_MS),
    ("payment_reasons", 10 * MINUTE_MS),
    ("suppliers", 5 * MINUTE_MS),
];

// == TTL Policy ==
/// Resolves the TTL for a data type.
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    default_ttl_ms: u64,
}

impl TtlPolicy {
    /// Policy whose fallback for unknown types is `default_ttl_ms`.
    pub fn new(default_ttl_ms: u64) -> Self {
        Self { default_ttl_ms }
    }

    pub fn ttl_ms(&self, data_type: &str) -> u64 {
        TTL_TABLE
            .iter()
            .find(|(name, _)| *name == data_type)
            .map(|(_, ttl)| *ttl)
            .unwrap_or(self.default_ttl_ms)
    }

    pub fn default_ttl_ms(&self) -> u64 {
        self.default_ttl_ms
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types() {
        let policy = TtlPolicy::default();
        assert_eq!(policy.ttl_ms("clients"), 300_000);
        assert_eq!(policy.ttl_ms("payment_reasons"), 600_000);
    }

    #[test]
    fn test_unknown_type_uses_default() {
        assert_eq!(TtlPolicy::default().ttl_ms("invoices"), DEFAULT_TTL_MS);
        assert_eq!(TtlPolicy::new(1_000).ttl_ms("invoices"), 1_000);
    }

    #[test]
    fn test_custom_default_does_not_override_table() {
        assert_eq!(TtlPolicy::new(1_000).ttl_ms("clients"), 300_000);
    }
}
