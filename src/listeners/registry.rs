//! Listener Registry
//!
//! Per-data-type subscription state machine:
//!
//! ```text
//! Unattached -> Attaching -> Attached -> Stopped
//!                   |
//!                   +-> Unattached (attach attempts exhausted)
//!                   +-> Stopped (stop_all while attaching)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheService;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::listeners::ListenerTarget;
use crate::remote::{
    ChangeCallback, DocumentSnapshot, ErrorCallback, RemoteError, RemoteStore, Subscription,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListenerState {
    Unattached,
    Attaching,
    Attached,
    Stopped,
}

// == Listener Config ==
/// Readiness polling and attach retry bounds.
#[derive(Debug, Clone, Copy)]
pub struct ListenerConfig {
    /// Delay between readiness checks
    pub poll_interval: Duration,
    /// Readiness checks before giving up
    pub max_polls: u32,
    /// Subscribe attempts per data type
    pub attach_attempts: u32,
    /// Fixed delay between subscribe attempts
    pub attach_backoff: Duration,
}

impl ListenerConfig {
    pub fn from_config(config: &Config) -> Self {
        let poll_interval = Duration::from_millis(config.listener_poll_interval_ms);
        Self {
            poll_interval,
            max_polls: config.listener_max_polls,
            attach_attempts: config.listener_attach_attempts.max(1),
            attach_backoff: poll_interval,
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            max_polls: 30,
            attach_attempts: 3,
            attach_backoff: Duration::from_millis(500),
        }
    }
}

enum Claim {
    Target(ListenerTarget),
    Skip,
    Stopped,
}

struct Slot {
    target: ListenerTarget,
    state: ListenerState,
    handle: Option<Subscription>,
}

// == Live Invalidation ==
pub struct LiveInvalidation {
    cache: Arc<CacheService>,
    remote: Arc<dyn RemoteStore>,
    config: ListenerConfig,
    slots: Mutex<Vec<Slot>>,
    // Bumped by stop_all; an initialize started earlier stops claiming slots
    stop_epoch: AtomicU64,
}

impl LiveInvalidation {
    pub fn new(
        cache: Arc<CacheService>,
        remote: Arc<dyn RemoteStore>,
        targets: Vec<ListenerTarget>,
        config: ListenerConfig,
    ) -> Self {
        let slots = targets
            .into_iter()
            .map(|target| Slot {
                target,
                state: ListenerState::Unattached,
                handle: None,
            })
            .collect();

        Self {
            cache,
            remote,
            config,
            slots: Mutex::new(slots),
            stop_epoch: AtomicU64::new(0),
        }
    }

    // == Initialize ==
    /// Waits for the remote store, then attaches every target without a handle.
    ///
    /// Returns the number of listeners attached by this call. Targets that
    /// cannot be attached stay `Unattached` and rely on TTL expiry. The slot
    /// lock is only held for state transitions, never across a wait.
    pub async fn initialize(&self) -> usize {
        let epoch = self.stop_epoch.load(Ordering::SeqCst);

        if !self.wait_until_ready().await {
            warn!(
                polls = self.config.max_polls,
                "Remote store unavailable, cache relies on TTL expiry only"
            );
            return 0;
        }

        info!("Initializing live cache invalidation listeners");
        let slot_count = self.slots.lock().await.len();
        let mut attached = 0;
        for index in 0..slot_count {
            let target = match self.claim(index, epoch).await {
                Claim::Target(target) => target,
                Claim::Skip => continue,
                Claim::Stopped => {
                    info!("Listener initialization cancelled by stop");
                    break;
                }
            };
            let result = self.attach(&target).await;
            if self.settle(index, result).await {
                attached += 1;
            }
        }

        info!(attached, "Live cache invalidation listeners initialized");
        attached
    }

    /// Marks a free slot `Attaching`. Slots already attached or being
    /// attached by a concurrent `initialize` are skipped.
    async fn claim(&self, index: usize, epoch: u64) -> Claim {
        let mut slots = self.slots.lock().await;
        if self.stop_epoch.load(Ordering::SeqCst) != epoch {
            return Claim::Stopped;
        }
        let Some(slot) = slots.get_mut(index) else {
            return Claim::Skip;
        };
        if slot.handle.is_some() || slot.state == ListenerState::Attaching {
            return Claim::Skip;
        }
        slot.state = ListenerState::Attaching;
        Claim::Target(slot.target.clone())
    }

    /// Records the outcome of an attach. Returns true if the listener is now live.
    async fn settle(&self, index: usize, result: Result<Subscription>) -> bool {
        let mut slots = self.slots.lock().await;
        let Some(slot) = slots.get_mut(index) else {
            return false;
        };

        match result {
            // stop_all ran while this attach was in flight
            Ok(handle) if slot.state == ListenerState::Stopped => {
                handle.unsubscribe();
                debug!(data_type = %slot.target.data_type, "Listener stopped during attach");
                false
            }
            Ok(handle) => {
                slot.handle = Some(handle);
                slot.state = ListenerState::Attached;
                debug!(data_type = %slot.target.data_type, path = %slot.target.path, "Listener attached");
                true
            }
            Err(e) => {
                if slot.state == ListenerState::Attaching {
                    slot.state = ListenerState::Unattached;
                }
                warn!(
                    data_type = %slot.target.data_type,
                    error = %e,
                    "Giving up on live invalidation, relying on TTL expiry"
                );
                false
            }
        }
    }

    async fn wait_until_ready(&self) -> bool {
        let mut polls = 0;
        while !self.remote.is_ready() {
            if polls >= self.config.max_polls {
                return false;
            }
            if polls == 0 {
                info!("Waiting for remote store before attaching cache listeners");
            }
            polls += 1;
            tokio::time::sleep(self.config.poll_interval).await;
        }
        true
    }

    async fn attach(&self, target: &ListenerTarget) -> Result<Subscription> {
        let mut last_error = RemoteError::NotReady;

        for attempt in 1..=self.config.attach_attempts {
            match self.remote.subscribe(
                &target.path,
                self.change_callback(target),
                self.error_callback(target),
            ) {
                Ok(handle) => return Ok(handle),
                Err(e) => {
                    debug!(data_type = %target.data_type, attempt, error = %e, "Attach attempt failed");
                    last_error = e;
                    if attempt < self.config.attach_attempts {
                        tokio::time::sleep(self.config.attach_backoff).await;
                    }
                }
            }
        }

        Err(CacheError::SubscriptionAttach {
            data_type: target.data_type.clone(),
            source: last_error,
        })
    }

    fn change_callback(&self, target: &ListenerTarget) -> ChangeCallback {
        let cache = self.cache.clone();
        let data_type = target.data_type.clone();
        Arc::new(move |snapshot: DocumentSnapshot| {
            if snapshot.exists() {
                info!(path = %snapshot.path, data_type = %data_type, "Remote change detected, invalidating cache");
                cache.invalidate_cache(data_type.as_str());
            }
        })
    }

    fn error_callback(&self, target: &ListenerTarget) -> ErrorCallback {
        let data_type = target.data_type.clone();
        Arc::new(move |error: RemoteError| {
            warn!(data_type = %data_type, error = %error, "Cache listener error");
        })
    }

    // == Stop ==
    /// Unsubscribes every attached listener. Returns how many were stopped.
    ///
    /// Cancels any `initialize` in progress. Attaches still in flight are
    /// marked `Stopped` and released as soon as they complete.
    pub async fn stop_all(&self) -> usize {
        let mut slots = self.slots.lock().await;
        self.stop_epoch.fetch_add(1, Ordering::SeqCst);
        let mut stopped = 0;

        for slot in slots.iter_mut() {
            if let Some(handle) = slot.handle.take() {
                handle.unsubscribe();
                slot.state = ListenerState::Stopped;
                stopped += 1;
                debug!(data_type = %slot.target.data_type, "Listener stopped");
            } else if slot.state == ListenerState::Attaching {
                slot.state = ListenerState::Stopped;
            }
        }

        info!(stopped, "Cache listeners stopped");
        stopped
    }

    pub async fn state(&self, data_type: &str) -> Option<ListenerState> {
        self.slots
            .lock()
            .await
            .iter()
            .find(|slot| slot.target.data_type == data_type)
            .map(|slot| slot.state)
    }

    pub async fn states(&self) -> Vec<(String, ListenerState)> {
        self.slots
            .lock()
            .await
            .iter()
            .map(|slot| (slot.target.data_type.clone(), slot.state))
            .collect()
    }
}

/// Runs `initialize` in the background so startup does not wait on the remote store.
pub fn spawn_listener_task(listeners: Arc<LiveInvalidation>) -> JoinHandle<usize> {
    tokio::spawn(async move { listeners.initialize().await })
}
