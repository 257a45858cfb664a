use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;
use weatherly_core::StorageError;

use crate::backend::{FileBackend, MemoryBackend, StorageBackend};

const EVENT_CAPACITY: usize = 64;

/// Notification that a key was written through some handle.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageEvent {
    pub key: String,
    /// Raw JSON written, or `None` when the key was removed
    pub new_value: Option<String>,
    /// Identifier of the writing handle
    pub origin: u64,
}

/// Shared storage handle.
///
/// Clones share the backend and the change channel.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn StorageBackend>,
    events: broadcast::Sender<StorageEvent>,
}

impl Storage {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { backend, events }
    }

    /// File-backed storage rooted at `dir`.
    pub fn file(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileBackend::new(dir)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }

    pub fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.backend.get_item(key)
    }

    /// Persist `value` and notify the other handles.
    ///
    /// No event is published when the write fails.
    pub fn write_raw(&self, key: &str, value: &str, origin: u64) -> Result<(), StorageError> {
        self.backend.set_item(key, value)?;
        self.publish(key, Some(value.to_string()), origin);
        Ok(())
    }

    pub fn remove(&self, key: &str, origin: u64) -> Result<(), StorageError> {
        self.backend.remove_item(key)?;
        self.publish(key, None, origin);
        Ok(())
    }

    fn publish(&self, key: &str, new_value: Option<String>, origin: u64) {
        // No subscribers is not an error
        let _ = self.events.send(StorageEvent {
            key: key.to_string(),
            new_value,
            origin,
        });
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("subscribers", &self.events.receiver_count())
            .finish()
    }
}
