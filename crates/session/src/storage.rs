//! Durable key-value seam for session state.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

/// Failure of the storage backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Backend(String),
}

/// Small synchronous key-value store the session layer persists through.
///
/// Writes are issued strictly after the in-memory state commits; the store
/// logs failures instead of propagating them into the mutation result, so
/// implementations must tolerate being called on the mutation path.
pub trait SessionStorage: Send + Sync {
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage.
///
/// Intended for tests/dev. Not durable.
#[derive(Debug, Default)]
pub struct InMemorySessionStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys (test helper).
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for InMemorySessionStorage {
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::Backend("lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::Backend("lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::Backend("lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}
