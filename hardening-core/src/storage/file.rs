//! File-backed storage.
//!
//! Each key is stored as `<key>.json` in the data directory:
//!
//! ```text
//! ~/.local/share/harden/
//! ├── monk_weight.json
//! ├── monk_streak_data.json
//! ├── monk_meal_log_2024-01-15.json
//! └── monk_water_2024-01-15.json
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::io;
use std::path::PathBuf;
use tokio::fs;

use super::{Result, StorageAdapter, StorageError};

const VALUE_EXTENSION: &str = "json";

#[derive(Clone, Debug)]
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    fn is_valid_key(key: &str) -> bool {
        !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    /// Returns the file path for a key.
    pub fn value_path(&self, key: &str) -> Result<PathBuf> {
        if !Self::is_valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.data_dir.join(format!("{}.{}", key, VALUE_EXTENSION)))
    }
}

#[async_trait]
impl StorageAdapter for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.value_path(key)?;

        match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    // Unreadable files read as absent; sanitizers supply defaults
                    tracing::warn!(key, error = %e, "Ignoring corrupt stored value");
                    Ok(None)
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }

    async fn set(&self, key: &str, value: &Value) -> Result<bool> {
        let path = self.value_path(key)?;
        let bytes =
            serde_json::to_vec(value).map_err(|e| StorageError::Serialize(key.to_string(), e))?;

        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| StorageError::Io(self.data_dir.clone(), e))?;

        let existed = fs::try_exists(&path).await.unwrap_or(false);
        fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::Io(path, e))?;
        Ok(existed)
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let path = self.value_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }

    fn check_key(&self, key: &str) -> Result<()> {
        self.value_path(key).map(|_| ())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(self.data_dir.clone(), e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::Io(self.data_dir.clone(), e))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if Self::is_valid_key(stem) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_key_reads_none() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data"));
        assert_eq!(storage.get("monk_weight").await.unwrap(), None);
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_creates_directory_and_round_trips() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("data"));

        let meals = json!([{ "name": "Oats", "cal": 300 }]);
        assert!(!storage.set("monk_meal_log_2024-01-15", &meals).await.unwrap());
        assert!(storage.set("monk_meal_log_2024-01-15", &meals).await.unwrap());
        assert_eq!(
            storage.get("monk_meal_log_2024-01-15").await.unwrap(),
            Some(meals)
        );
        assert_eq!(
            storage.keys().await.unwrap(),
            vec!["monk_meal_log_2024-01-15"]
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set("monk_weight", &json!(70)).await.unwrap();
        assert!(storage.remove("monk_weight").await.unwrap());
        assert!(!storage.remove("monk_weight").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_path_keys() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        for key in ["../escape", "a/b", "", "dot.key"] {
            let err = storage.set(key, &json!(1)).await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "{}", key);
        }
    }

    #[test]
    fn test_check_key_matches_write_rule() {
        let storage = FileStorage::new("data");
        assert!(storage.check_key("monk_water_2024-01-01").is_ok());
        let err = storage.check_key("monk_water_2024 01 01").unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_none() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("monk_weight.json"), b"{not json").unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.get("monk_weight").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_skips_foreign_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hi").unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set("monk_streak_data", &json!({})).await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["monk_streak_data"]);
    }
}
