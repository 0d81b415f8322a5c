//! Remote Store Module
//!
//! The narrow interface to the remote authoritative document store: readiness,
//! get/set document, and live change subscriptions.

mod memory;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryRemote;

// == Remote Error ==
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The live-subscription capability is not available yet
    #[error("Remote store is not ready")]
    NotReady,

    /// Attaching a listener failed
    #[error("Failed to subscribe to {path}: {reason}")]
    Subscribe { path: String, reason: String },

    /// Any other backend failure
    #[error("Remote store error: {0}")]
    Backend(String),
}

// == Document Path ==
/// `collection/id` address of a remote document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    pub collection: String,
    pub id: String,
}

impl DocumentPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

// == Document Snapshot ==
/// State of a document delivered to change listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub path: DocumentPath,
    /// None when the document does not exist
    pub data: Option<Value>,
}

impl DocumentSnapshot {
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }
}

pub type ChangeCallback = Arc<dyn Fn(DocumentSnapshot) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(RemoteError) + Send + Sync>;

// == Subscription ==
/// Unsubscribe capability returned by `RemoteStore::subscribe`.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Detaches the listener. Dropping a `Subscription` does not unsubscribe.
    pub fn unsubscribe(mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// Remote document store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Whether the live-subscription capability is available yet.
    fn is_ready(&self) -> bool;

    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Value>, RemoteError>;

    async fn set_document(&self, path: &DocumentPath, data: Value) -> Result<(), RemoteError>;

    /// Registers change and error callbacks for `path`.
    fn subscribe(
        &self,
        path: &DocumentPath,
        on_change: ChangeCallback,
        on_error: ErrorCallback,
    ) -> Result<Subscription, RemoteError>;
}
