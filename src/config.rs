use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::Schedule;

/// API used when running against a local server.
pub const LOCAL_API_URL: &str = "http://localhost:3000/api";

/// Default interval between background pushes.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;

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

fn default_interval() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

/// Sync configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Explicit API base URL (e.g. "http://localhost:3000/api"). Wins over host resolution.
    pub server_url: Option<String>,
    /// Host name the client runs as. Local hosts talk to the local server.
    pub host: Option<String>,
    /// API base URL used when the host is not local.
    pub deployed_url: Option<String>,
    /// Push after write commands (default: false)
    #[serde(default)]
    pub auto_sync: bool,
    /// Seconds between pushes in `sync watch`
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            host: None,
            deployed_url: None,
            auto_sync: false,
            interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
        }
    }
}

impl SyncConfig {
    /// Resolves the API base URL.
    ///
    /// An explicit `server_url` wins. Otherwise `localhost`, `127.0.0.1` or no
    /// host at all selects the local server, and any other host selects
    /// `deployed_url`.
    pub fn api_base_url(&self) -> Option<String> {
        if let Some(url) = self.server_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Some(url.trim().trim_end_matches('/').to_string());
        }

        let local = match self.host.as_deref().map(str::trim) {
            None | Some("") | Some("localhost") | Some("127.0.0.1") => true,
            Some(_) => false,
        };
        if local {
            Some(LOCAL_API_URL.to_string())
        } else {
            self.deployed_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(|u| u.trim_end_matches('/').to_string())
        }
    }

    /// Returns true if an API base URL can be resolved
    pub fn is_configured(&self) -> bool {
        self.api_base_url().is_some()
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the local store
    pub data_dir: ConfigValue<PathBuf>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Sync configuration
    pub sync: SyncConfig,
    /// Supplement schedule, meal plan and default weekly workout plan
    pub schedule: Schedule,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    sync: Option<SyncConfig>,
    schedule: Option<Schedule>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Like [`Config::load`], reading environment variables through `env`.
    pub fn load_with(
        config_path: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut config_file = None;
        let mut sync = SyncConfig::default();
        let mut schedule = Schedule::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = if contents.trim().is_empty() {
                ConfigFile::default()
            } else {
                serde_yaml::from_str(&contents)
                    .map_err(|e| ConfigError::ParseError(path.clone(), e))?
            };

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
            if let Some(sync_config) = file_config.sync {
                sync = sync_config;
            }
            if let Some(file_schedule) = file_config.schedule {
                schedule = file_schedule;
            }
        }

        // Apply environment variable overrides
        if let Some(dir) = env("GAINS_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Some(url) = env("GAINS_API_URL") {
            sync.server_url = Some(url);
        }
        if let Some(host) = env("GAINS_HOST") {
            sync.host = Some(host);
        }

        Ok(Self {
            data_dir,
            config_file,
            sync,
            schedule,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/gains/
    /// - macOS: ~/Library/Application Support/gains/
    /// - Windows: %APPDATA%/gains/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gains")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/gains/
    /// - macOS: ~/Library/Application Support/gains/
    /// - Windows: %APPDATA%/gains/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gains")
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
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealType;
    use std::io::Write;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load_with(Some(config_path), no_env).unwrap();
        assert!(config.data_dir.value.ends_with("gains"));
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert!(config.config_file.is_none());
        assert_eq!(config.sync, SyncConfig::default());
        assert_eq!(config.sync.interval_secs, 300);
        assert_eq!(config.schedule, Schedule::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /custom/gains").unwrap();
        writeln!(file, "sync:").unwrap();
        writeln!(file, "  server_url: http://example.test/api").unwrap();
        writeln!(file, "  auto_sync: true").unwrap();

        let config = Config::load_with(Some(config_path.clone()), no_env).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/custom/gains"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(config.config_file, Some(config_path));
        assert!(config.sync.auto_sync);
        assert_eq!(config.sync.interval_secs, 300);
        assert_eq!(
            config.sync.api_base_url().as_deref(),
            Some("http://example.test/api")
        );
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: store\n").unwrap();

        let config = Config::load_with(Some(config_path), no_env).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("store"));
    }

    #[test]
    fn test_schedule_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            r#"
schedule:
  meal_plan:
    - time: "07:00"
      meal: breakfast
      food: Oats
"#,
        )
        .unwrap();

        let config = Config::load_with(Some(config_path), no_env).unwrap();
        assert_eq!(config.schedule.meal_plan.len(), 1);
        assert_eq!(config.schedule.meal_plan[0].meal, MealType::Breakfast);
        assert!(config.schedule.supplements.is_empty());
    }

    #[test]
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            "data_dir: /from/file\nsync:\n  server_url: http://file.test/api\n",
        )
        .unwrap();

        let env = |key: &str| match key {
            "GAINS_DATA_DIR" => Some("/from/env".to_string()),
            "GAINS_API_URL" => Some("http://env.test/api".to_string()),
            "GAINS_HOST" => Some("phone.lan".to_string()),
            _ => None,
        };

        let config = Config::load_with(Some(config_path), env).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/from/env"));
        assert_eq!(config.data_dir.source, ConfigSource::Environment);
        assert_eq!(config.sync.host.as_deref(), Some("phone.lan"));
        assert_eq!(
            config.sync.api_base_url().as_deref(),
            Some("http://env.test/api")
        );
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load_with(Some(config_path), no_env);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "").unwrap();

        let config = Config::load_with(Some(config_path.clone()), no_env).unwrap();
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_api_base_url_by_host() {
        let mut sync = SyncConfig::default();
        assert_eq!(sync.api_base_url().as_deref(), Some(LOCAL_API_URL));

        sync.host = Some("127.0.0.1".to_string());
        assert_eq!(sync.api_base_url().as_deref(), Some(LOCAL_API_URL));

        sync.host = Some("gains.example.com".to_string());
        assert_eq!(sync.api_base_url(), None);
        assert!(!sync.is_configured());

        sync.deployed_url = Some("https://api.gains.example.com/api/".to_string());
        assert_eq!(
            sync.api_base_url().as_deref(),
            Some("https://api.gains.example.com/api")
        );

        sync.server_url = Some("http://override.test/api".to_string());
        assert_eq!(
            sync.api_base_url().as_deref(),
            Some("http://override.test/api")
        );
    }
}
