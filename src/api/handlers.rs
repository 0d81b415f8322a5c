//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::{CacheMetricsReport, CacheService, CacheStats};
use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::listeners::{default_targets, document_path_for, ListenerConfig, LiveInvalidation};
use crate::models::{
    validate_data_type, DataQuery, DataResponse, HealthResponse, InvalidateResponse,
    ListenersResponse, MessageResponse, SweepResponse, ValidityResponse,
};
use crate::remote::{MemoryRemote, RemoteStore};
use crate::storage::{FileStorage, MemoryStorage, StorageBackend};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache service with its metrics
    pub cache: Arc<CacheService>,
    /// Document store acting as the remote source of truth
    pub remote: Arc<dyn RemoteStore>,
    /// Live invalidation listeners bound to `cache` and `remote`
    pub listeners: Arc<LiveInvalidation>,
}

impl AppState {
    pub fn new(
        cache: Arc<CacheService>,
        remote: Arc<dyn RemoteStore>,
        listeners: Arc<LiveInvalidation>,
    ) -> Self {
        Self {
            cache,
            remote,
            listeners,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Uses file storage when `storage_dir` is set and in-memory storage
    /// otherwise. Listeners are created but not attached.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage: Arc<dyn StorageBackend> = match &config.storage_dir {
            Some(dir) => Arc::new(FileStorage::new(dir.clone())?),
            None => Arc::new(MemoryStorage::new()),
        };
        let cache = Arc::new(CacheService::from_config(
            config,
            Arc::new(SystemClock),
            storage,
        ));
        let remote: Arc<dyn RemoteStore> = Arc::new(MemoryRemote::new());
        let listeners = Arc::new(LiveInvalidation::new(
            cache.clone(),
            remote.clone(),
            default_targets(),
            ListenerConfig::from_config(config),
        ));

        Ok(Self::new(cache, remote, listeners))
    }
}

fn checked_data_type(raw: &str) -> Result<&str> {
    match validate_data_type(raw) {
        Some(reason) => Err(CacheError::InvalidRequest(reason)),
        None => Ok(raw),
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /stats
///
/// Entry counts, per-type sizes and metrics snapshot.
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.cache_stats())
}

/// Handler for GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Json<CacheMetricsReport> {
    Json(state.cache.log_cache_metrics())
}

/// Handler for POST /metrics/reset
pub async fn reset_metrics_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.reset_cache_metrics();
    Json(MessageResponse::new("Cache metrics reset"))
}

/// Handler for GET /cache/:data_type/valid
pub async fn validity_handler(
    State(state): State<AppState>,
    Path(data_type): Path<String>,
) -> Result<Json<ValidityResponse>> {
    let data_type = checked_data_type(&data_type)?;

    Ok(Json(ValidityResponse {
        data_type: data_type.to_string(),
        valid: state.cache.is_cache_valid(data_type),
        ttl_ms: state.cache.store().ttl_ms(data_type),
    }))
}

/// Handler for DELETE /cache/:data_type
///
/// `all` clears every cache entry.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(data_type): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    let scope = checked_data_type(&data_type)?;
    let removed = state.cache.invalidate_cache(scope);

    Ok(Json(InvalidateResponse::new(scope, removed)))
}

/// Handler for POST /sweep
pub async fn sweep_handler(State(state): State<AppState>) -> Json<SweepResponse> {
    Json(SweepResponse {
        evicted: state.cache.clean_expired_cache(),
    })
}

/// Handler for GET /data/:data_type
///
/// Remote-first read through the cache. Never fails once the data type is
/// valid: an unreachable remote falls back to the cache or an empty value.
pub async fn get_data_handler(
    State(state): State<AppState>,
    Path(data_type): Path<String>,
    Query(query): Query<DataQuery>,
) -> Result<Json<DataResponse>> {
    let data_type = checked_data_type(&data_type)?;
    let path = document_path_for(data_type);
    let remote = state.remote.clone();

    let data = state
        .cache
        .get_data_with_cache_as(data_type, query.shape.into(), || async move {
            let document = remote.get_document(&path).await?;
            Ok(document.unwrap_or(Value::Null))
        })
        .await;

    Ok(Json(DataResponse::new(data_type, data)))
}

/// Handler for PUT /data/:data_type
///
/// Writes the remote document. Attached listeners invalidate the cache entry.
pub async fn put_data_handler(
    State(state): State<AppState>,
    Path(data_type): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<DataResponse>> {
    let data_type = checked_data_type(&data_type)?;
    state
        .remote
        .set_document(&document_path_for(data_type), body.clone())
        .await?;

    Ok(Json(DataResponse::new(data_type, body)))
}

/// Handler for GET /listeners
pub async fn listeners_handler(State(state): State<AppState>) -> Json<ListenersResponse> {
    Json(ListenersResponse::from(state.listeners.states().await))
}
