//! Backup export and import.
//!
//! A backup is one JSON object holding a `meta` block plus every stored key
//! and its value:
//!
//! ```json
//! {
//!   "meta": { "version": "0.1.0", "date": "2024-01-15T10:30:00.000Z", "user": "SYSTEM_HARDENING_USER" },
//!   "monk_weight": 72.5,
//!   "monk_meal_log_2024-01-15": [ ... ]
//! }
//! ```
//!
//! Imports are sanitized in full before anything is deleted. The clear and
//! write phase that follows is not atomic: a storage failure part way
//! through leaves a partially restored store.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde_json::{json, Map, Value};

use crate::catalog::ExerciseCatalog;
use crate::keys::StorageKey;
use crate::models::DEFAULT_WEIGHT;
use crate::sanitize::{is_truthy, is_valid_iso_date, sanitize_entry, SanitizeContext};
use crate::storage::{StorageAdapter, StorageError};

/// User label written into backup metadata.
pub const DEFAULT_USER: &str = "SYSTEM_HARDENING_USER";

/// Days after which a backup is considered stale.
pub const BACKUP_WARNING_DAYS: i64 = 7;

const META_KEY: &str = "meta";

/// Errors raised inside the backup pipeline.
///
/// Import and restore report these through [`ImportOutcome`]; export returns
/// them directly.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Invalid backup file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A rendered export.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupExport {
    /// Pretty-printed backup document.
    pub json: String,
    /// Suggested file name, `system_hardening_backup_YYYY-MM-DD.json`.
    pub file_name: String,
}

/// Result of checking a document's structure.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportValidation {
    pub valid: bool,
    pub data: Option<Map<String, Value>>,
    pub error: Option<String>,
}

impl ImportValidation {
    fn rejected(error: &str) -> Self {
        Self {
            valid: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

/// Result of an import or restore.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub success: bool,
    /// `meta.date` of the imported document.
    pub date: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStatus {
    /// No backup has ever been exported.
    Never,
    /// The last backup is stale or its date is unreadable.
    Warning,
    Ok,
}

impl BackupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupStatus::Never => "NEVER",
            BackupStatus::Warning => "WARNING",
            BackupStatus::Ok => "OK",
        }
    }
}

impl std::fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Export, import and backup status over a storage backend.
pub struct BackupService<S> {
    storage: S,
    version: String,
    user: String,
    catalog: ExerciseCatalog,
    default_weight: f64,
}

impl<S: StorageAdapter> BackupService<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            version: env!("CARGO_PKG_VERSION").to_string(),
            user: DEFAULT_USER.to_string(),
            catalog: ExerciseCatalog::any(),
            default_weight: DEFAULT_WEIGHT,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_catalog(mut self, catalog: ExerciseCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_default_weight(mut self, weight: f64) -> Self {
        self.default_weight = weight;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn context(&self) -> SanitizeContext {
        SanitizeContext::new(self.catalog.clone()).with_default_weight(self.default_weight)
    }

    async fn collect(&self, now: DateTime<Utc>, auto_backup: bool) -> Result<Value, StorageError> {
        let mut data = Map::new();
        let stored = self.storage.keys().await?;

        for key in StorageKey::ALL {
            if key.is_prefix() {
                for raw in stored.iter().filter(|k| k.starts_with(key.key())) {
                    if let Some(value) = self.storage.get(raw).await? {
                        data.insert(raw.clone(), value);
                    }
                }
            } else if let Some(value) = self.storage.get(key.key()).await? {
                data.insert(key.key().to_string(), value);
            }
        }

        let mut meta = json!({
            "version": self.version,
            "date": now.to_rfc3339_opts(SecondsFormat::Millis, true),
            "user": self.user,
        });
        if auto_backup {
            meta["autoBackup"] = Value::Bool(true);
        }
        data.insert(META_KEY.to_string(), meta);
        Ok(Value::Object(data))
    }

    /// Builds a backup document without recording a backup date.
    pub async fn create_backup_data(&self) -> Result<Value, StorageError> {
        self.collect(Utc::now(), true).await
    }

    /// Renders a backup and records today as the last backup date.
    pub async fn export_data(&self) -> Result<BackupExport, BackupError> {
        let data = self.collect(Utc::now(), false).await?;
        let json = serde_json::to_string_pretty(&data)?;

        let today = self.context().today_str();
        self.storage
            .set(StorageKey::Backup.key(), &Value::String(today.clone()))
            .await?;

        let key_count = data.as_object().map_or(0, |m| m.len() - 1);
        tracing::info!(keys = key_count, "Exported backup");

        Ok(BackupExport {
            json,
            file_name: format!("system_hardening_backup_{}.json", today),
        })
    }

    /// Checks that `data` is an object with metadata and at least one
    /// registered key.
    pub fn validate_import_data(&self, data: &Value) -> ImportValidation {
        let Some(map) = data.as_object() else {
            return ImportValidation::rejected("Invalid data format");
        };
        if !map.get(META_KEY).is_some_and(is_truthy) {
            return ImportValidation::rejected("Missing metadata");
        }
        let has_known_key = map
            .keys()
            .filter(|k| k.as_str() != META_KEY)
            .any(|k| StorageKey::classify(k).is_some());
        if !has_known_key {
            return ImportValidation::rejected("No valid data keys found");
        }
        ImportValidation {
            valid: true,
            data: Some(map.clone()),
            error: None,
        }
    }

    /// Parses, validates, sanitizes and restores a backup document.
    pub async fn import_data(&self, json: &str) -> ImportOutcome {
        let parsed = match serde_json::from_str::<Value>(json) {
            Ok(value) => value,
            Err(e) => return Self::failed(BackupError::from(e)),
        };
        self.restore_from_data(&parsed).await
    }

    /// Restores an already-parsed backup document.
    pub async fn restore_from_data(&self, data: &Value) -> ImportOutcome {
        match self.restore(data).await {
            Ok(date) => {
                tracing::info!(date = date.as_deref().unwrap_or("unknown"), "Imported backup");
                ImportOutcome {
                    success: true,
                    date,
                    error: None,
                }
            }
            Err(e) => Self::failed(e),
        }
    }

    fn failed(error: BackupError) -> ImportOutcome {
        match &error {
            BackupError::Storage(e) => tracing::error!(error = %e, "Import failed"),
            other => tracing::warn!(error = %other, "Import rejected"),
        }
        ImportOutcome {
            success: false,
            date: None,
            error: Some(error.to_string()),
        }
    }

    async fn restore(&self, data: &Value) -> Result<Option<String>, BackupError> {
        let validation = self.validate_import_data(data);
        let Some(map) = validation.data else {
            return Err(BackupError::Invalid(
                validation.error.unwrap_or_else(|| "Invalid backup data".to_string()),
            ));
        };

        let ctx = self.context();
        let mut entries = Vec::new();
        for (key, value) in &map {
            if key == META_KEY {
                continue;
            }
            let Some(family) = StorageKey::classify(key) else {
                tracing::debug!(key = %key, "Skipping unregistered key");
                continue;
            };
            if family.is_prefix() && !family.date_suffix(key).is_some_and(is_valid_iso_date) {
                tracing::debug!(key = %key, "Skipping key without a valid date");
                continue;
            }
            self.storage.check_key(key)?;
            let safe = sanitize_entry(key, value, &ctx);
            if !safe.is_null() {
                entries.push((key.clone(), safe));
            }
        }

        self.clear_existing_data().await?;
        for (key, value) in &entries {
            self.storage.set(key, value).await?;
        }

        let date = map
            .get(META_KEY)
            .and_then(|m| m.get("date"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(date)
    }

    /// Removes every app-owned key. Returns how many were removed.
    pub async fn clear_existing_data(&self) -> Result<usize, StorageError> {
        let mut removed = 0;
        for key in self.storage.keys().await? {
            if StorageKey::owns(&key) && self.storage.remove(&key).await? {
                removed += 1;
            }
        }
        tracing::debug!(removed, "Cleared stored data");
        Ok(removed)
    }

    pub async fn check_backup_status(&self) -> Result<BackupStatus, StorageError> {
        self.check_backup_status_at(Utc::now()).await
    }

    /// Backup status as seen at `now`.
    pub async fn check_backup_status_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<BackupStatus, StorageError> {
        let last = self.storage.get(StorageKey::Backup.key()).await?;
        let Some(last) = last.filter(is_truthy) else {
            return Ok(BackupStatus::Never);
        };
        let Some(last) = last.as_str().and_then(parse_backup_date) else {
            return Ok(BackupStatus::Warning);
        };

        let elapsed_ms = (now - last).num_milliseconds().unsigned_abs();
        let day_ms = 24 * 60 * 60 * 1000;
        let days = elapsed_ms.div_ceil(day_ms);
        if days > BACKUP_WARNING_DAYS as u64 {
            Ok(BackupStatus::Warning)
        } else {
            Ok(BackupStatus::Ok)
        }
    }
}

/// Reads a stored backup date, either a bare `YYYY-MM-DD` (midnight UTC) or
/// an RFC 3339 timestamp.
fn parse_backup_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Today's date in local time.
pub fn local_today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
