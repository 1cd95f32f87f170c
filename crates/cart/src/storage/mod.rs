//! Key-value storage collaborator.
//!
//! The cart lives under a single key as a JSON string. Backends only need to
//! read and replace that string; they never see the cart structure.

use std::future::Future;

use thiserror::Error;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem or OS level failure.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend refused or could not serve the request.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// An asynchronous string key-value store.
///
/// The store owns one key per cart. `get` returns `Ok(None)` for a key that
/// was never written.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}
