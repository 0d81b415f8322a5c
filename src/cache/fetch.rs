//! Fetch Strategy Module
//!
//! Remote-first reads with the cache as fallback:
//! 1. remote loader, saved to cache when it yields data
//! 2. a valid cache entry
//! 3. an empty default

use std::future::Future;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::cache::CacheService;

/// Shape of the empty default returned when nothing is available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayloadShape {
    /// `[]`
    List,
    /// `{}`
    #[default]
    Map,
}

impl PayloadShape {
    pub fn empty(self) -> Value {
        match self {
            PayloadShape::List => Value::Array(Vec::new()),
            PayloadShape::Map => Value::Object(Map::new()),
        }
    }
}

/// True for a non-empty array or an object with at least one key.
///
/// Anything else counts as "no data" and is never written to the cache.
pub fn is_usable_payload(payload: &Value) -> bool {
    match payload {
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        _ => false,
    }
}

impl CacheService {
    // == Get Data With Cache ==
    /// Remote-first fetch with an empty object as the final fallback.
    ///
    /// Never fails: loader errors are logged and degrade to the cache.
    pub async fn get_data_with_cache<F, Fut>(&self, data_type: &str, loader: F) -> Value
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>>,
    {
        self.get_data_with_cache_as(data_type, PayloadShape::Map, loader)
            .await
    }

    /// Remote-first fetch whose final fallback is `shape`'s empty value.
    pub async fn get_data_with_cache_as<F, Fut>(
        &self,
        data_type: &str,
        shape: PayloadShape,
        loader: F,
    ) -> Value
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>>,
    {
        let started = self.clock().now_ms();

        match loader().await {
            Ok(payload) => {
                let elapsed = self.clock().now_ms().saturating_sub(started);
                self.metrics().record_remote_load_time(elapsed);

                if is_usable_payload(&payload) {
                    self.store().save(data_type, &payload);
                    self.metrics().record_remote_load(data_type);
                    info!(data_type, elapsed_ms = elapsed, "Loaded from remote and cached");
                    return payload;
                }
                debug!(data_type, "Remote returned no data, falling back to cache");
            }
            Err(e) => {
                warn!(data_type, error = %e, "Remote load failed, falling back to cache");
            }
        }

        if let Some(cached) = self.store().load(data_type) {
            info!(data_type, "Serving cached data, remote unavailable");
            return cached;
        }

        self.metrics().record_miss(data_type);
        warn!(data_type, "No data available from remote or cache");
        shape.empty()
    }
}
