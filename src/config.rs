// Configuration file and directory resolution

use crate::models::{DEFAULT_TIMESTAMP_FORMAT, Priority, validate_timestamp_format};
use crate::store::StoreOptions;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const APP_DIR: &str = "tasklist";
const CONFIG_FILENAME: &str = "config.yml";

/// Environment variable overriding [`data_dir`]
pub const DATA_DIR_ENV: &str = "TASKLIST_DATA_DIR";

/// Environment variable overriding [`config_dir`]
pub const CONFIG_DIR_ENV: &str = "TASKLIST_CONFIG_DIR";

/// User configuration; every field has a default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `tasklist.db`
    pub data_dir: PathBuf,
    /// Activate the last stored filter mode on startup
    pub restore_filter: bool,
    /// Priority used by `add` when none is given
    pub default_priority: Priority,
    /// chrono format for task creation timestamps
    pub timestamp_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: data_dir(),
            restore_filter: false,
            default_priority: Priority::Low,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, `config.yml` in
    /// [`config_dir`] is used when present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = config_dir().join(CONFIG_FILENAME);
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    debug!(path = ?default_path, "No config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = ?path, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: Self = serde_yaml::from_str(content).context("Failed to parse YAML")?;
        config.check_timestamp_format();
        Ok(config)
    }

    /// Replace an unusable `timestamp_format` with the default
    fn check_timestamp_format(&mut self) {
        if let Err(e) = validate_timestamp_format(&self.timestamp_format) {
            warn!(error = %e, "Falling back to default timestamp format");
            self.timestamp_format = DEFAULT_TIMESTAMP_FORMAT.to_string();
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            restore_filter: self.restore_filter,
            timestamp_format: self.timestamp_format.clone(),
        }
    }
}

/// Directory for the task database
///
/// `TASKLIST_DATA_DIR` if set, else `dirs::data_dir()/tasklist`.
pub fn data_dir() -> PathBuf {
    resolve_dir(std::env::var_os(DATA_DIR_ENV), dirs::data_dir(), "/tmp/tasklist-data")
}

/// Directory searched for `config.yml`
///
/// `TASKLIST_CONFIG_DIR` if set, else `dirs::config_dir()/tasklist`.
pub fn config_dir() -> PathBuf {
    resolve_dir(std::env::var_os(CONFIG_DIR_ENV), dirs::config_dir(), "/tmp/tasklist-config")
}

fn resolve_dir(override_dir: Option<OsString>, platform_dir: Option<PathBuf>, fallback: &str) -> PathBuf {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    platform_dir
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.restore_filter);
        assert_eq!(config.default_priority, Priority::Low);
        assert_eq!(config.timestamp_format, DEFAULT_TIMESTAMP_FORMAT);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("restore_filter: true\ndefault_priority: High\n").unwrap();
        assert!(config.restore_filter);
        assert_eq!(config.default_priority, Priority::High);
        assert_eq!(config.timestamp_format, DEFAULT_TIMESTAMP_FORMAT);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_valid_timestamp_format_kept() {
        let config = Config::from_yaml("timestamp_format: \"%d.%m.%Y %H:%M\"\n").unwrap();
        assert_eq!(config.timestamp_format, "%d.%m.%Y %H:%M");
    }

    #[test]
    fn test_unknown_timestamp_specifier_falls_back() {
        let config = Config::from_yaml("timestamp_format: \"%Q\"\nrestore_filter: true\n").unwrap();
        assert_eq!(config.timestamp_format, DEFAULT_TIMESTAMP_FORMAT);
        assert!(config.restore_filter);
    }

    #[test]
    fn test_invalid_yaml_errors() {
        assert!(Config::from_yaml("default_priority: Urgent\n").is_err());
        assert!(Config::from_yaml("restore_filter: [oops\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        let data = temp.path().join("data");
        fs::write(
            &path,
            format!("data_dir: {}\ntimestamp_format: \"%Y-%m-%d\"\n", data.display()),
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.data_dir, data);
        assert_eq!(config.timestamp_format, "%Y-%m-%d");
        assert_eq!(config.store_options().timestamp_format, "%Y-%m-%d");
    }

    #[test]
    fn test_explicit_missing_file_errors() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(&temp.path().join("nope.yml"))).is_err());
    }

    #[test]
    fn test_resolve_dir() {
        let platform = Some(PathBuf::from("/home/u/.local/share"));

        assert_eq!(
            resolve_dir(Some(OsString::from("/custom")), platform.clone(), "/tmp/x"),
            PathBuf::from("/custom")
        );
        assert_eq!(
            resolve_dir(Some(OsString::new()), platform.clone(), "/tmp/x"),
            PathBuf::from("/home/u/.local/share/tasklist")
        );
        assert_eq!(
            resolve_dir(None, platform, "/tmp/x"),
            PathBuf::from("/home/u/.local/share/tasklist")
        );
        assert_eq!(resolve_dir(None, None, "/tmp/x"), PathBuf::from("/tmp/x"));
    }
}
