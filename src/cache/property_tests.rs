//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify the cache's correctness properties against a
//! manual clock and in-memory storage.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::{CacheService, LatencyWindow, TtlPolicy, ALL_SCOPE, MAX_LATENCY_SAMPLES};
use crate::clock::{Clock, ManualClock};
use crate::storage::{MemoryStorage, StorageBackend};

// == Test Helpers ==
struct Harness {
    service: CacheService,
    clock: Arc<ManualClock>,
    storage: Arc<MemoryStorage>,
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let storage = Arc::new(MemoryStorage::new());
    let service = CacheService::new(clock.clone(), storage.clone());
    Harness {
        service,
        clock,
        storage,
    }
}

// == Strategies ==
/// Known data types plus arbitrary ones that fall back to the default TTL
fn data_type_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("clients".to_string()),
        Just("vehicles".to_string()),
        Just("payment_reasons".to_string()),
        "[a-z_]{1,16}",
    ]
}

/// Non-empty payloads, list or object
fn payload_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::collection::vec(0u32..1000, 1..8).prop_map(|ids| json!(ids)),
        "[a-z]{1,12}".prop_map(|name| json!({ "name": name })),
    ]
}

fn empty_payload_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![Just(json!([])), Just(json!({}))]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Save { data_type: String, payload: Value },
    Load { data_type: String },
    Invalidate { data_type: String },
    Advance { ms: u64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (data_type_strategy(), payload_strategy())
            .prop_map(|(data_type, payload)| CacheOp::Save { data_type, payload }),
        data_type_strategy().prop_map(|data_type| CacheOp::Load { data_type }),
        data_type_strategy().prop_map(|data_type| CacheOp::Invalidate { data_type }),
        (0u64..400_000).prop_map(|ms| CacheOp::Advance { ms }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hit/miss accounting: every load is exactly one hit or one miss.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let h = harness();
        let mut expected_hits: u64 = 0;
        let mut expected_loads: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Save { data_type, payload } => {
                    h.service.save_to_cache(&data_type, &payload);
                }
                CacheOp::Load { data_type } => {
                    expected_loads += 1;
                    if h.service.get_from_cache(&data_type).is_some() {
                        expected_hits += 1;
                    }
                }
                CacheOp::Invalidate { data_type } => {
                    h.service.invalidate_cache(data_type.as_str());
                }
                CacheOp::Advance { ms } => h.clock.advance(ms),
            }
        }

        let summary = h.service.cache_metrics().summary;
        prop_assert_eq!(summary.total_hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(summary.total_hits + summary.total_misses, expected_loads, "Loads mismatch");
    }

    // TTL monotonicity: valid right after save, invalid from age == ttl on,
    // never valid again without another save.
    #[test]
    fn prop_ttl_monotonicity(
        data_type in data_type_strategy(),
        payload in payload_strategy(),
        steps in prop::collection::vec(1u64..120_000, 1..20)
    ) {
        let h = harness();
        let ttl = TtlPolicy::default().ttl_ms(&data_type);

        h.service.save_to_cache(&data_type, &payload);
        prop_assert!(h.service.is_cache_valid(&data_type));

        let written_at = h.clock.now_ms();
        let mut seen_invalid = false;
        for step in steps {
            h.clock.advance(step);
            let valid = h.service.is_cache_valid(&data_type);
            let age = h.clock.now_ms() - written_at;
            prop_assert_eq!(valid, age < ttl);
            if seen_invalid {
                prop_assert!(!valid, "Entry became valid again after expiring");
            }
            seen_invalid |= !valid;
        }
    }

    // A load on an expired entry is a miss and deletes the entry.
    #[test]
    fn prop_expired_load_deletes_entry(
        data_type in data_type_strategy(),
        payload in payload_strategy(),
        extra in 0u64..1_000_000
    ) {
        let h = harness();
        h.service.save_to_cache(&data_type, &payload);
        h.clock.advance(TtlPolicy::default().ttl_ms(&data_type) + extra);

        prop_assert!(h.service.get_from_cache(&data_type).is_none());
        let key = format!("erp_cache_{}", data_type);
        prop_assert!(h.storage.get_item(&key).unwrap().is_none());
        prop_assert_eq!(h.service.metrics().counters(&data_type).misses, 1);
    }

    // Empty remote payloads are never written and never hide cached data.
    #[test]
    fn prop_no_empty_payload_poisoning(
        data_type in data_type_strategy(),
        previous in prop::option::of(payload_strategy()),
        empty in empty_payload_strategy()
    ) {
        let h = harness();
        if let Some(payload) = &previous {
            h.service.save_to_cache(&data_type, payload);
        }
        let saves_before = h.service.metrics().counters(&data_type).saves;

        let returned = tokio_test::block_on(
            h.service.get_data_with_cache(&data_type, || async move { Ok(empty) }),
        );

        prop_assert_eq!(h.service.metrics().counters(&data_type).saves, saves_before);
        match previous {
            Some(payload) => {
                prop_assert_eq!(&returned, &payload);
                prop_assert_eq!(h.service.get_from_cache(&data_type), Some(payload));
            }
            None => {
                prop_assert_eq!(returned, json!({}));
                prop_assert!(h.service.get_from_cache(&data_type).is_none());
            }
        }
    }

    // Remote-first: a successful remote load wins over a valid cache entry.
    #[test]
    fn prop_remote_first_precedence(
        data_type in data_type_strategy(),
        cached in payload_strategy(),
        remote in payload_strategy()
    ) {
        let h = harness();
        h.service.save_to_cache(&data_type, &cached);

        let expected = remote.clone();
        let returned = tokio_test::block_on(
            h.service.get_data_with_cache(&data_type, || async move { Ok(remote) }),
        );

        prop_assert_eq!(&returned, &expected);
        prop_assert_eq!(h.service.get_from_cache(&data_type), Some(expected));
    }

    // Fallback ordering: loader errors fall back to the cache, then to empty.
    #[test]
    fn prop_fallback_ordering(
        data_type in data_type_strategy(),
        cached in prop::option::of(payload_strategy())
    ) {
        let h = harness();
        if let Some(payload) = &cached {
            h.service.save_to_cache(&data_type, payload);
        }

        let returned = tokio_test::block_on(h.service.get_data_with_cache(&data_type, || async {
            Err(anyhow::anyhow!("remote unavailable"))
        }));

        prop_assert_eq!(returned, cached.unwrap_or_else(|| json!({})));
    }

    // Sweeper idempotence: a second sweep at the same instant evicts nothing.
    #[test]
    fn prop_sweeper_idempotence(
        entries in prop::collection::vec((data_type_strategy(), 0u64..900_000), 1..20),
        elapsed in 0u64..900_000
    ) {
        let h = harness();
        let start = h.clock.now_ms();
        let mut latest_write = std::collections::HashMap::new();
        for (data_type, offset) in &entries {
            h.clock.set(start + offset);
            h.service.save_to_cache(data_type, &json!([1]));
            latest_write.insert(data_type.clone(), start + offset);
        }
        let now = start + 900_000 + elapsed;
        h.clock.set(now);

        let expected = latest_write
            .iter()
            .filter(|(data_type, written)| now - **written >= TtlPolicy::default().ttl_ms(data_type))
            .count();

        prop_assert_eq!(h.service.clean_expired_cache(), expected);
        prop_assert_eq!(h.service.clean_expired_cache(), 0);
    }

    // Invalidate-all removes every cache entry and nothing else.
    #[test]
    fn prop_invalidate_all_scope(
        cached in prop::collection::hash_set(data_type_strategy(), 0..10),
        unrelated in prop::collection::hash_set("[a-z]{1,10}", 0..10)
    ) {
        let h = harness();
        for data_type in &cached {
            h.service.save_to_cache(data_type, &json!({"v": 1}));
        }
        for key in &unrelated {
            h.storage.set_item(&format!("session_{}", key), "keep").unwrap();
        }

        prop_assert_eq!(h.service.invalidate_cache(ALL_SCOPE), cached.len());

        let remaining: HashSet<String> = h.storage.keys().unwrap().into_iter().collect();
        let expected: HashSet<String> =
            unrelated.iter().map(|key| format!("session_{}", key)).collect();
        prop_assert_eq!(remaining, expected);
    }

    // Latency windows never exceed their bound and keep the newest samples.
    #[test]
    fn prop_latency_window_bounded(samples in prop::collection::vec(0u64..10_000, 0..400)) {
        let mut window = LatencyWindow::default();
        for sample in &samples {
            window.push(*sample);
            prop_assert!(window.len() <= MAX_LATENCY_SAMPLES);
        }

        let tail: Vec<u64> = samples.iter().rev().take(MAX_LATENCY_SAMPLES).copied().collect();
        let expected = if tail.is_empty() {
            None
        } else {
            Some(tail.iter().sum::<u64>() as f64 / tail.len() as f64)
        };
        prop_assert_eq!(window.average(), expected);
    }
}
