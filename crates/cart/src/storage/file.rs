//! File-backed storage backend.
//!
//! Each key maps to `<dir>/<percent-encoded key>.json`. Writes go to a
//! sibling `.tmp` file first and are renamed over the target, so a reader
//! never observes a half-written cart.

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::instrument;

use super::{KeyValueStore, StorageError};

/// A directory of JSON files, one per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The file a key is stored in.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl KeyValueStore for FileStore {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value), fields(dir = %self.dir.display(), bytes = value.len()))]
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let target = self.path_for(key);
        let temp = target.with_extension("json.tmp");
        tokio::fs::write(&temp, value).await?;
        tokio::fs::rename(&temp, &target).await?;
        Ok(())
    }
}
