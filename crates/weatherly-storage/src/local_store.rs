//! A typed value persisted under one storage key.
//!
//! Reads never fail: a missing key yields the initial value, a malformed one
//! yields the initial value and a [`Loaded::Degraded`] load status. Writes
//! update memory first, then persist; persistence failures are logged and
//! otherwise ignored.
//!
//! Handles sharing one [`Storage`] are notified through its change channel.
//! Every `get` and `update` also re-reads the backend, so handles on separate
//! `Storage` instances over the same files converge too.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::loaded::Loaded;
use crate::store::{Storage, StorageEvent};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

struct Inner<T> {
    value: T,
    events: broadcast::Receiver<StorageEvent>,
}

pub struct LocalStore<T> {
    storage: Storage,
    key: String,
    id: u64,
    load_status: Loaded<()>,
    inner: Mutex<Inner<T>>,
}

impl<T> LocalStore<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Bind a handle to `key`, reading its current value.
    ///
    /// The handle subscribes to changes made through other handles and
    /// unsubscribes when dropped.
    pub fn bind(storage: &Storage, key: impl Into<String>, initial: T) -> Self {
        let key = key.into();
        // Subscribe before reading so no write between the two is missed
        let events = storage.subscribe();
        let loaded = read_value(storage, &key, initial);
        if let Some(reason) = loaded.reason() {
            tracing::warn!("Error loading {} from storage: {}", key, reason);
        }

        let load_status = match &loaded {
            Loaded::Fresh(_) => Loaded::Fresh(()),
            Loaded::Degraded { reason, .. } => Loaded::degraded((), reason.clone()),
        };

        Self {
            storage: storage.clone(),
            key,
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            load_status,
            inner: Mutex::new(Inner {
                value: loaded.into_value(),
                events,
            }),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the initial read succeeded, and why not if it didn't.
    pub fn load_status(&self) -> &Loaded<()> {
        &self.load_status
    }

    /// Current value, including changes written through other handles or
    /// other storage instances.
    pub fn get(&self) -> T {
        let mut inner = self.inner.lock();
        self.sync(&mut inner);
        inner.value.clone()
    }

    pub fn set(&self, value: T) {
        self.update(|_| value);
    }

    /// Replace the value with `f(current)` and persist it.
    ///
    /// `current` is re-read first, so a write made elsewhere is not lost.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let mut inner = self.inner.lock();
        self.sync(&mut inner);
        inner.value = f(&inner.value);

        let raw = match serde_json::to_string(&inner.value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Error serializing {}: {}", self.key, e);
                return;
            }
        };

        if let Err(e) = self.storage.write_raw(&self.key, &raw, self.id) {
            tracing::warn!("Error saving {} to storage: {}", self.key, e);
        }
    }

    /// Apply pending foreign writes to the in-memory value.
    fn sync(&self, inner: &mut Inner<T>) {
        loop {
            match inner.events.try_recv() {
                Ok(event) => {
                    if event.key != self.key || event.origin == self.id {
                        continue;
                    }
                    // Removals leave the current value in place
                    let Some(raw) = event.new_value else {
                        continue;
                    };
                    match serde_json::from_str(&raw) {
                        Ok(value) => inner.value = value,
                        Err(e) => {
                            tracing::warn!("Error syncing {} from storage event: {}", self.key, e)
                        }
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!("{} missed {} storage events, re-reading", self.key, skipped);
                    let current = inner.value.clone();
                    if let Loaded::Fresh(value) = read_value(&self.storage, &self.key, current) {
                        inner.value = value;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        // Unreadable or removed keys keep the current value
        match self.storage.read_raw(&self.key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => inner.value = value,
                Err(e) => tracing::debug!("Ignoring malformed {} in storage: {}", self.key, e),
            },
            Ok(None) => {}
            Err(e) => tracing::debug!("Error re-reading {}: {}", self.key, e),
        }
    }
}

fn read_value<T: DeserializeOwned>(storage: &Storage, key: &str, fallback: T) -> Loaded<T> {
    match storage.read_raw(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Loaded::Fresh(value),
            Err(e) => Loaded::degraded(fallback, format!("malformed stored value: {}", e)),
        },
        Ok(None) => Loaded::Fresh(fallback),
        Err(e) => Loaded::degraded(fallback, e.to_string()),
    }
}

impl<T> std::fmt::Debug for LocalStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}
