use clap::Args;
use std::path::PathBuf;

use hardening_core::{BackupService, BackupStatus, FileStorage, StorageAdapter, StorageKey};

use crate::config::Config;

fn service(config: &Config) -> BackupService<FileStorage> {
    BackupService::new(FileStorage::new(config.data_dir.value.clone()))
        .with_user(config.user.value.clone())
        .with_catalog(config.catalog())
        .with_default_weight(config.default_weight.value)
}

/// Write a backup of all tracked data to a JSON file
#[derive(Args)]
pub struct ExportCommand {
    /// Output file (defaults to system_hardening_backup_<date>.json in the current directory)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl ExportCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let export = service(config).export_data().await?;
        let path = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&export.file_name));

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, export.json.as_bytes()).await?;

        println!("Exported backup to {}", path.display());
        Ok(())
    }
}

/// Replace all tracked data with the contents of a backup file
#[derive(Args)]
pub struct ImportCommand {
    /// Backup file to restore
    file: PathBuf,
}

impl ImportCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let json = tokio::fs::read_to_string(&self.file)
            .await
            .map_err(|e| format!("Failed to read '{}': {}", self.file.display(), e))?;

        let outcome = service(config).import_data(&json).await;
        if !outcome.success {
            let reason = outcome.error.unwrap_or_else(|| "unknown error".to_string());
            return Err(format!("Import failed: {}", reason).into());
        }

        match outcome.date {
            Some(date) => println!("Imported backup from {}", date),
            None => println!("Imported backup"),
        }
        Ok(())
    }
}

/// Show how recently a backup was exported
#[derive(Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let service = service(config);
        let status = service.check_backup_status().await?;
        let last = service.storage().get(StorageKey::Backup.key()).await?;

        println!("Backup status: {}", status);
        match (status, last.as_ref().and_then(|v| v.as_str())) {
            (BackupStatus::Never, _) | (_, None) => {
                println!("No backup has been exported. Run 'harden export'.")
            }
            (BackupStatus::Warning, Some(date)) => {
                println!("Last backup: {} (older than a week, run 'harden export')", date)
            }
            (BackupStatus::Ok, Some(date)) => println!("Last backup: {}", date),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigSource, ConfigValue};
    use serde_json::json;
    use tempfile::tempdir;

    fn config(data_dir: PathBuf) -> Config {
        Config {
            data_dir: ConfigValue::new(data_dir, ConfigSource::Default),
            user: ConfigValue::new("tester".to_string(), ConfigSource::Default),
            default_weight: ConfigValue::new(60.0, ConfigSource::Default),
            exercises: ConfigValue::new(Vec::new(), ConfigSource::Default),
            config_file: None,
        }
    }

    #[tokio::test]
    async fn test_export_then_import_into_other_dir() {
        let temp_dir = tempdir().unwrap();
        let source = config(temp_dir.path().join("source"));
        FileStorage::new(source.data_dir.value.clone())
            .set("monk_weight", &json!(81.5))
            .await
            .unwrap();

        let backup = temp_dir.path().join("out").join("backup.json");
        ExportCommand {
            output: Some(backup.clone()),
        }
        .run(&source)
        .await
        .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&backup).unwrap()).unwrap();
        assert_eq!(written["meta"]["user"], "tester");
        assert_eq!(written["monk_weight"], 81.5);

        let target = config(temp_dir.path().join("target"));
        ImportCommand { file: backup }.run(&target).await.unwrap();
        let restored = FileStorage::new(target.data_dir.value.clone())
            .get("monk_weight")
            .await
            .unwrap();
        assert_eq!(restored, Some(json!(81.5)));
    }

    #[tokio::test]
    async fn test_import_rejects_invalid_file() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("bad.json");
        std::fs::write(&file, r#"{"unknownKey": 1}"#).unwrap();

        let err = ImportCommand { file }
            .run(&config(temp_dir.path().join("data")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Missing metadata"));
    }
}
