use hardening_core::models::DEFAULT_WEIGHT;
use hardening_core::{ExerciseCatalog, DEFAULT_USER};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding one JSON file per storage key
    pub data_dir: ConfigValue<PathBuf>,
    /// User name written into backup metadata
    pub user: ConfigValue<String>,
    /// Body weight used when none has been stored
    pub default_weight: ConfigValue<f64>,
    /// Exercise ids accepted in workout data (empty accepts any)
    pub exercises: ConfigValue<Vec<String>>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    user: Option<String>,
    default_weight: Option<f64>,
    exercises: Option<Vec<String>>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut user = ConfigValue::new(DEFAULT_USER.to_string(), ConfigSource::Default);
        let mut default_weight = ConfigValue::new(DEFAULT_WEIGHT, ConfigSource::Default);
        let mut exercises = ConfigValue::new(Vec::new(), ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(name) = file_config.user {
                user = ConfigValue::new(name, ConfigSource::File);
            }
            if let Some(weight) = file_config.default_weight {
                if !(20.0..=500.0).contains(&weight) {
                    return Err(ConfigError::InvalidValue(
                        path.clone(),
                        format!("default_weight must be between 20 and 500, got {}", weight),
                    ));
                }
                default_weight = ConfigValue::new(weight, ConfigSource::File);
            }
            if let Some(ids) = file_config.exercises {
                exercises = ConfigValue::new(ids, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(dir) = std::env::var("HARDEN_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(name) = std::env::var("HARDEN_USER") {
            user = ConfigValue::new(name, ConfigSource::Environment);
        }

        Ok(Self {
            data_dir,
            user,
            default_weight,
            exercises,
            config_file,
        })
    }

    /// Exercise ids accepted by the sanitizers.
    pub fn catalog(&self) -> ExerciseCatalog {
        if self.exercises.value.is_empty() {
            ExerciseCatalog::any()
        } else {
            ExerciseCatalog::from_ids(self.exercises.value.iter().cloned())
        }
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/harden/
    /// - macOS: ~/Library/Application Support/harden/
    /// - Windows: %APPDATA%/harden/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("harden")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/harden/
    /// - macOS: ~/Library/Application Support/harden/
    /// - Windows: %APPDATA%/harden/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("harden")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(PathBuf, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(path, message) => {
                write!(f, "Invalid config file '{}': {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.data_dir.value.to_string_lossy().contains("harden"));
        assert_eq!(config.user.value, DEFAULT_USER);
        assert_eq!(config.user.source, ConfigSource::Default);
        assert_eq!(config.default_weight.value, DEFAULT_WEIGHT);
        assert!(config.exercises.value.is_empty());
        assert!(config.config_file.is_none());
        assert_eq!(config.catalog(), ExerciseCatalog::any());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /custom/data").unwrap();
        writeln!(file, "user: testuser").unwrap();
        writeln!(file, "default_weight: 70.5").unwrap();
        writeln!(file, "exercises: [pushup, squat]").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/custom/data"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(config.user.value, "testuser");
        assert_eq!(config.default_weight.value, 70.5);
        assert_eq!(config.exercises.source, ConfigSource::File);
        assert_eq!(config.config_file, Some(config_path));

        let catalog = config.catalog();
        assert!(catalog.contains("pushup"));
        assert!(!catalog.contains("deadlift"));
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: data\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("data"));
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "user: fromfile\n").unwrap();

        std::env::set_var("HARDEN_USER", "fromenv");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.user.value, "fromenv");
        assert_eq!(config.user.source, ConfigSource::Environment);

        std::env::remove_var("HARDEN_USER");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "invalid: yaml: content: [\n").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_out_of_range_default_weight() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "default_weight: 5\n").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("default_weight"));
    }
}
