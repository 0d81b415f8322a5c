//! Data types watched for live invalidation and their remote documents.

use crate::remote::DocumentPath;

/// Collection holding the shared configuration documents.
pub const CONFIGURATION_COLLECTION: &str = "configuration";

/// (data type, document id) pairs watched by default.
const WATCHED: &[(&str, &str)] = &[
    ("clients", "clients"),
    ("vehicles", "tractors"),
    ("operators", "operators"),
    ("stays", "stays"),
    ("suppliers", "suppliers"),
];

/// A data type and the remote document whose changes invalidate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerTarget {
    pub data_type: String,
    pub path: DocumentPath,
}

impl ListenerTarget {
    pub fn new(data_type: impl Into<String>, path: DocumentPath) -> Self {
        Self {
            data_type: data_type.into(),
            path,
        }
    }
}

pub fn default_targets() -> Vec<ListenerTarget> {
    WATCHED
        .iter()
        .map(|(data_type, id)| {
            ListenerTarget::new(*data_type, DocumentPath::new(CONFIGURATION_COLLECTION, *id))
        })
        .collect()
}

/// Remote document backing `data_type`; unwatched types use their own name as id.
pub fn document_path_for(data_type: &str) -> DocumentPath {
    let id = WATCHED
        .iter()
        .find(|(name, _)| *name == data_type)
        .map(|(_, id)| *id)
        .unwrap_or(data_type);
    DocumentPath::new(CONFIGURATION_COLLECTION, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_targets() {
        let targets = default_targets();
        assert_eq!(targets.len(), 5);
        assert_eq!(targets[1].data_type, "vehicles");
        assert_eq!(targets[1].path.to_string(), "configuration/tractors");
    }

    #[test]
    fn test_document_path_for() {
        assert_eq!(document_path_for("vehicles").to_string(), "configuration/tractors");
        assert_eq!(
            document_path_for("payment_reasons").to_string(),
            "configuration/payment_reasons"
        );
    }
}
