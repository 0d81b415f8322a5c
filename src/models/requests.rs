//! Request DTOs for the admin API
//!
//! Defines query parameters and path validation for incoming requests.

use serde::Deserialize;

use crate::cache::PayloadShape;

/// Maximum accepted data type length in bytes
pub const MAX_DATA_TYPE_LENGTH: usize = 256;

/// Empty default requested by `GET /data/:data_type?shape=...`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeParam {
    List,
    #[default]
    Map,
}

impl From<ShapeParam> for PayloadShape {
    fn from(shape: ShapeParam) -> Self {
        match shape {
            ShapeParam::List => PayloadShape::List,
            ShapeParam::Map => PayloadShape::Map,
        }
    }
}

/// Query string for `GET /data/:data_type`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataQuery {
    #[serde(default)]
    pub shape: ShapeParam,
}

/// Validates a data type taken from the request path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_data_type(data_type: &str) -> Option<String> {
    if data_type.is_empty() {
        return Some("Data type cannot be empty".to_string());
    }
    if data_type.len() > MAX_DATA_TYPE_LENGTH {
        return Some(format!(
            "Data type exceeds maximum length of {} characters",
            MAX_DATA_TYPE_LENGTH
        ));
    }
    if !data_type
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Some("Data type may only contain letters, digits, '_' and '-'".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_query_deserialize() {
        let query: DataQuery = serde_json::from_str(r#"{"shape": "list"}"#).unwrap();
        assert_eq!(query.shape, ShapeParam::List);
    }

    #[test]
    fn test_data_query_default_shape() {
        let query: DataQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(PayloadShape::from(query.shape), PayloadShape::Map);
    }

    #[test]
    fn test_validate_empty_data_type() {
        assert!(validate_data_type("").is_some());
    }

    #[test]
    fn test_validate_rejects_path_characters() {
        assert!(validate_data_type("../clients").is_some());
    }

    #[test]
    fn test_validate_valid_data_type() {
        assert!(validate_data_type("payment_reasons").is_none());
    }
}
