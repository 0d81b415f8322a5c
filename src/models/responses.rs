//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::listeners::ListenerState;

/// Response body for `GET /data/:data_type`
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse {
    pub data_type: String,
    pub data: Value,
}

impl DataResponse {
    pub fn new(data_type: impl Into<String>, data: Value) -> Self {
        Self {
            data_type: data_type.into(),
            data,
        }
    }
}

/// Response body for `DELETE /cache/:data_type`
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// The data type, or "all"
    pub scope: String,
    /// Entries deleted
    pub removed: usize,
}

impl InvalidateResponse {
    pub fn new(scope: impl Into<String>, removed: usize) -> Self {
        let scope = scope.into();
        Self {
            message: format!("Cache '{}' invalidated", scope),
            scope,
            removed,
        }
    }
}

/// Response body for `POST /sweep`
#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    pub evicted: usize,
}

/// Response body for `GET /cache/:data_type/valid`
#[derive(Debug, Clone, Serialize)]
pub struct ValidityResponse {
    pub data_type: String,
    pub valid: bool,
    /// TTL applied to this data type
    pub ttl_ms: u64,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One live listener and its state
#[derive(Debug, Clone, Serialize)]
pub struct ListenerStatus {
    pub data_type: String,
    pub state: ListenerState,
}

/// Response body for `GET /listeners`
#[derive(Debug, Clone, Serialize)]
pub struct ListenersResponse {
    pub listeners: Vec<ListenerStatus>,
}

impl From<Vec<(String, ListenerState)>> for ListenersResponse {
    fn from(states: Vec<(String, ListenerState)>) -> Self {
        Self {
            listeners: states
                .into_iter()
                .map(|(data_type, state)| ListenerStatus { data_type, state })
                .collect(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalidate_response_serialize() {
        let resp = InvalidateResponse::new("all", 3);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["scope"], "all");
        assert_eq!(json["removed"], 3);
        assert!(json["message"].as_str().unwrap().contains("invalidated"));
    }

    #[test]
    fn test_data_response_serialize() {
        let resp = DataResponse::new("clients", json!([{"id": 1}]));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["data"][0]["id"], 1);
    }

    #[test]
    fn test_listeners_response_from_states() {
        let resp = ListenersResponse::from(vec![(
            "clients".to_string(),
            ListenerState::Attached,
        )]);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["listeners"][0]["state"], "Attached");
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
