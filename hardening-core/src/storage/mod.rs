//! Key-value persistence behind an async adapter.
//!
//! Values are JSON documents addressed by storage key (see
//! [`StorageKey`](crate::keys::StorageKey)). The backend is picked once at
//! construction time and passed around as a [`StorageAdapter`].

mod file;
mod memory;

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Errors returned by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error for {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode value for '{0}': {1}")]
    Serialize(String, #[source] serde_json::Error),

    #[error("Storage quota exceeded writing '{key}' ({needed} of {quota} bytes)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Async key-value store for JSON values.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Reads a value. Returns `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Writes a value. Returns `true` if an existing value was replaced.
    async fn set(&self, key: &str, value: &Value) -> Result<bool>;

    /// Deletes a value. Returns `true` if the key existed.
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Lists every stored key.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Fails with [`StorageError::InvalidKey`] if `key` could never be written.
    fn check_key(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<S: StorageAdapter + ?Sized> StorageAdapter for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &Value) -> Result<bool> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key).await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        (**self).keys().await
    }

    fn check_key(&self, key: &str) -> Result<()> {
        (**self).check_key(key)
    }
}
