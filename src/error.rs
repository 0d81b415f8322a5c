//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror. Cache operations use these
//! internally and degrade to fallback values at the public boundary; the admin
//! API turns them into JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::remote::RemoteError;
use crate::storage::StorageError;

// == Cache Error Enum ==
/// Unified error type for the cache layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Local storage rejected a read or write (quota exceeded, I/O)
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),

    /// A stored entry could not be parsed
    #[error("Corrupt cache entry for '{data_type}': {source}")]
    CorruptEntry {
        data_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// Payload could not be serialized for storage
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The remote store rejected a read or write
    #[error("Remote store failure: {0}")]
    Remote(#[from] RemoteError),

    /// A live subscription could not be attached
    #[error("Subscription attach failed for '{data_type}': {source}")]
    SubscriptionAttach {
        data_type: String,
        #[source]
        source: RemoteError,
    },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Remote(_) | CacheError::SubscriptionAttach { .. } => {
                StatusCode::BAD_GATEWAY
            }
            CacheError::Storage(StorageError::QuotaExceeded { .. }) => {
                StatusCode::INSUFFICIENT_STORAGE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
