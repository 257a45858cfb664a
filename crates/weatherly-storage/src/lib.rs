//! Durable key/value storage for Weatherly client state.
//!
//! Values are JSON-encoded per key. Every [`Storage`] clone is a separate
//! context over the same data; [`LocalStore`] handles bound to one key converge
//! through the store's change channel.

pub mod backend;
pub mod loaded;
pub mod local_store;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use loaded::Loaded;
pub use local_store::LocalStore;
pub use store::{Storage, StorageEvent};
pub use weatherly_core::StorageError;
