use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{Result, StorageAdapter, StorageError};

/// In-memory storage, used by tests and as a scratch backend.
///
/// An optional quota bounds the total size of keys plus encoded values.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<BTreeMap<String, Value>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects writes once `bytes` would be exceeded.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            quota: Some(bytes),
        }
    }

    /// Storage seeded with `data`.
    pub fn with_data<I, K>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            data: RwLock::new(data.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            quota: None,
        }
    }

    /// Copy of everything stored.
    pub async fn snapshot(&self) -> BTreeMap<String, Value> {
        self.data.read().await.clone()
    }

    fn entry_size(key: &str, value: &Value) -> Result<usize> {
        let encoded =
            serde_json::to_vec(value).map_err(|e| StorageError::Serialize(key.to_string(), e))?;
        Ok(key.len() + encoded.len())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> Result<bool> {
        let mut data = self.data.write().await;

        if let Some(quota) = self.quota {
            let mut needed = Self::entry_size(key, value)?;
            for (k, v) in data.iter().filter(|(k, _)| k.as_str() != key) {
                needed += Self::entry_size(k, v)?;
            }
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        Ok(data.insert(key.to_string(), value.clone()).is_some())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.data.write().await.remove(key).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.data.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_set_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("monk_weight").await.unwrap(), None);

        assert!(!storage.set("monk_weight", &json!(72.5)).await.unwrap());
        assert!(storage.set("monk_weight", &json!(73.0)).await.unwrap());
        assert_eq!(storage.get("monk_weight").await.unwrap(), Some(json!(73.0)));

        assert!(storage.remove("monk_weight").await.unwrap());
        assert!(!storage.remove("monk_weight").await.unwrap());
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_with_data() {
        let storage = MemoryStorage::with_data([("a", json!(1)), ("b", json!(2))]);
        assert_eq!(storage.keys().await.unwrap(), vec!["a", "b"]);
        assert_eq!(storage.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_quota_exceeded() {
        let storage = MemoryStorage::with_quota(32);
        storage.set("k", &json!("small")).await.unwrap();

        let err = storage
            .set("big", &json!("x".repeat(64)))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(storage.get("big").await.unwrap(), None);

        // replacing a key does not count its old value
        storage.set("k", &json!("other")).await.unwrap();
    }
}
