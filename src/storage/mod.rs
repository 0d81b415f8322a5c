//! Storage Module
//!
//! Local key/value string storage the cache persists its entries into.
//!
//! # Backends
//! - `MemoryStorage`: process memory, with an optional byte quota
//! - `FileStorage`: one JSON file per key under a directory

mod file;
mod memory;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

// == Storage Error ==
/// Failures raised by a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Writing the item would exceed the backend quota
    #[error("Quota exceeded writing '{key}': {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Local persistent key/value storage.
///
/// Calls are synchronous and treated as fast; any of them may fail.
pub trait StorageBackend: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}
