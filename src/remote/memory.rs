//! In-process document store with live change notifications.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{
    ChangeCallback, DocumentPath, DocumentSnapshot, ErrorCallback, RemoteError, RemoteStore,
    Subscription,
};

struct Listener {
    path: DocumentPath,
    on_change: ChangeCallback,
    on_error: ErrorCallback,
}

type Listeners = Mutex<HashMap<u64, Listener>>;

fn lock(listeners: &Listeners) -> MutexGuard<'_, HashMap<u64, Listener>> {
    listeners.lock().unwrap_or_else(|e| e.into_inner())
}

// == Memory Remote ==
/// Remote store kept in memory.
///
/// Listeners receive the current snapshot on subscribe and a new one after
/// every write or delete of their document.
pub struct MemoryRemote {
    documents: RwLock<HashMap<DocumentPath, Value>>,
    listeners: Arc<Listeners>,
    next_id: AtomicU64,
    ready: AtomicBool,
    failing_subscribes: AtomicU32,
}

impl MemoryRemote {
    /// A store that is ready immediately.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            listeners: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            ready: AtomicBool::new(true),
            failing_subscribes: AtomicU32::new(0),
        }
    }

    /// A store whose subscription capability comes up later via `set_ready`.
    pub fn not_ready() -> Self {
        let remote = Self::new();
        remote.set_ready(false);
        remote
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Makes the next `count` subscribe calls fail.
    pub fn fail_next_subscribes(&self, count: u32) {
        self.failing_subscribes.store(count, Ordering::SeqCst);
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    pub fn delete_document(&self, path: &DocumentPath) {
        self.documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(path);
        self.notify(path, None);
    }

    /// Delivers `error` to every listener on `path`.
    pub fn emit_error(&self, path: &DocumentPath, error: RemoteError) {
        let callbacks: Vec<ErrorCallback> = lock(&self.listeners)
            .values()
            .filter(|l| &l.path == path)
            .map(|l| l.on_error.clone())
            .collect();
        for on_error in callbacks {
            on_error(error.clone());
        }
    }

    fn read_document(&self, path: &DocumentPath) -> Option<Value> {
        self.documents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
    }

    fn notify(&self, path: &DocumentPath, data: Option<Value>) {
        // Callbacks run outside the lock so they may unsubscribe
        let callbacks: Vec<ChangeCallback> = lock(&self.listeners)
            .values()
            .filter(|l| &l.path == path)
            .map(|l| l.on_change.clone())
            .collect();

        debug!(path = %path, listeners = callbacks.len(), "Delivering document snapshot");
        for on_change in callbacks {
            on_change(DocumentSnapshot {
                path: path.clone(),
                data: data.clone(),
            });
        }
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Value>, RemoteError> {
        Ok(self.read_document(path))
    }

    async fn set_document(&self, path: &DocumentPath, data: Value) -> Result<(), RemoteError> {
        self.documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.clone(), data.clone());
        self.notify(path, Some(data));
        Ok(())
    }

    fn subscribe(
        &self,
        path: &DocumentPath,
        on_change: ChangeCallback,
        on_error: ErrorCallback,
    ) -> Result<Subscription, RemoteError> {
        if !self.is_ready() {
            return Err(RemoteError::NotReady);
        }

        let failing = self
            .failing_subscribes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(RemoteError::Subscribe {
                path: path.to_string(),
                reason: "listener rejected".to_string(),
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.listeners).insert(
            id,
            Listener {
                path: path.clone(),
                on_change: on_change.clone(),
                on_error,
            },
        );

        on_change(DocumentSnapshot {
            path: path.clone(),
            data: self.read_document(path),
        });

        let listeners: Weak<Listeners> = Arc::downgrade(&self.listeners);
        Ok(Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                lock(&listeners).remove(&id);
            }
        }))
    }
}
