//! Key-value string stores
//!
//! The history is persisted as a single string value under a fixed key. A
//! [`KeyValueStore`] is all the history needs from its backing storage: read a
//! value, replace a value, remove a value.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

/// A store of string values keyed by string.
pub trait KeyValueStore {
    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored under the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes the value stored under `key`.
    ///
    /// Removing a key that is not present is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be modified.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store refused the operation (for example, because it is full).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A store that only lives in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// A filesystem backed store.
///
/// Each key is stored in its own file, `<root>/<key>.json`. The root
/// directory is created on the first write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at the given directory.
    ///
    /// The directory does not need to exist yet.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The directory values are stored in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No stored value at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        // write beside the target then rename, so a failed write leaves the
        // previous value intact
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        tracing::trace!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("key").unwrap(), None);

        store.set("key", "value").unwrap();
        assert_eq!(store.get("key").unwrap().as_deref(), Some("value"));

        store.remove("key").unwrap();
        assert_eq!(store.get("key").unwrap(), None);
    }

    #[test]
    fn file_store_missing_key_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("missing"));
        assert_eq!(store.get("key").unwrap(), None);
    }

    #[test]
    fn file_store_creates_its_directory() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("nested").join("data");
        let mut store = FileStore::new(root.clone());

        store.set("history", "[]").unwrap();

        assert_eq!(
            fs::read_to_string(root.join("history.json")).unwrap(),
            "[]"
        );
        assert_eq!(store.get("history").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn file_store_overwrites_values() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path().to_path_buf());

        store.set("history", "first").unwrap();
        store.set("history", "second").unwrap();

        assert_eq!(store.get("history").unwrap().as_deref(), Some("second"));
        assert!(!tmp.path().join("history.json.tmp").exists());
    }

    #[test]
    fn file_store_remove_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path().to_path_buf());

        store.set("history", "[]").unwrap();
        store.remove("history").unwrap();
        store.remove("history").unwrap();

        assert_eq!(store.get("history").unwrap(), None);
    }
}
