//! Durable token storage.
//!
//! A small key/value store mirroring the session's tokens across restarts.
//! The absence of [`ACCESS_TOKEN_KEY`] is the canonical "logged out" signal.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Key holding the bearer access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key holding the refresh token (stored, never exchanged).
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Errors raised by a token store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("token store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("token store at {path} is corrupt: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value persistence for session tokens.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process store, for tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object on disk.
///
/// Every write rewrites the whole file; a missing file reads as empty.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|source| StorageError::Format {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(entries).map_err(|source| StorageError::Format {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    fn update<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all()?;
        f(&mut entries);
        self.write_all(&entries)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);

        store.set(ACCESS_TOKEN_KEY, "abc").unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        store.remove(ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileTokenStore::new(&path);
        store.set(ACCESS_TOKEN_KEY, "access-1").unwrap();
        store.set(REFRESH_TOKEN_KEY, "refresh-1").unwrap();

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("access-1"));
        assert_eq!(reopened.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("refresh-1"));

        reopened.remove(ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
        store.remove(ACCESS_TOKEN_KEY).unwrap();
    }

    #[test]
    fn test_corrupt_file_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(matches!(store.get(ACCESS_TOKEN_KEY), Err(StorageError::Format { .. })));
    }
}
