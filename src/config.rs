//! Configuration file support
//!
//! Reads flat TOML from `$TM_CONFIG` or `~/.taskrc`:
//!
//! ```toml
//! default_priority = "high"
//! default_category = "work"
//! reminder_interval = 30
//! ```

use crate::model::Priority;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment override for the config file location
pub const CONFIG_PATH_ENV: &str = "TM_CONFIG";

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Priority for tasks added without one
    /// Default: medium
    #[serde(default)]
    pub default_priority: Priority,

    /// Category for tasks added without one, stored lowercase
    /// Default: "personal"
    #[serde(default = "default_category")]
    pub default_category: String,

    /// Seconds between reminder polls
    /// Default: 60
    #[serde(default = "default_reminder_interval")]
    pub reminder_interval: u64,
}

fn default_category() -> String {
    "personal".to_string()
}

fn default_reminder_interval() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_priority: Priority::default(),
            default_category: default_category(),
            reminder_interval: default_reminder_interval(),
        }
    }
}

impl Config {
    /// Load config from the default location.
    /// Returns defaults if the file doesn't exist; warns and returns defaults if it is unusable.
    pub fn load() -> Self {
        match Self::find_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::default(),
        }
    }

    /// Load config from an explicit file, falling back to defaults with a warning
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Could not read config file {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match Self::parse(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse and validate TOML config text
    pub fn parse(contents: &str) -> Result<Self, String> {
        let mut config: Config = toml::from_str(contents).map_err(|e| e.to_string())?;

        config.default_category = config.default_category.trim().to_lowercase();
        if config.default_category.is_empty() {
            return Err("default_category cannot be empty".to_string());
        }
        if config.reminder_interval == 0 {
            return Err("reminder_interval must be at least 1 second".to_string());
        }
        Ok(config)
    }

    /// `$TM_CONFIG`, else `~/.taskrc`
    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(".taskrc"))
    }

    pub fn reminder_period(&self) -> Duration {
        Duration::from_secs(self.reminder_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_priority, Priority::Medium);
        assert_eq!(config.default_category, "personal");
        assert_eq!(config.reminder_period(), Duration::from_secs(60));
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
default_priority = "high"
default_category = "Work"
reminder_interval = 15
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.default_priority, Priority::High);
        assert_eq!(config.default_category, "work");
        assert_eq!(config.reminder_interval, 15);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let config = Config::parse("default_category = \"school\"").unwrap();
        assert_eq!(config.default_priority, Priority::Medium);
        assert_eq!(config.reminder_interval, 60);
        assert_eq!(config.default_category, "school");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::parse("default_priority = \"urgent\"").is_err());
        assert!(Config::parse("reminder_interval = 0").is_err());
        assert!(Config::parse("reminder_interval = \"soon\"").is_err());
        assert!(Config::parse("default_category = \"  \"").is_err());
        assert!(Config::parse("colour = true").is_err());
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".taskrc");
        std::fs::write(&path, "this is [not toml").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".taskrc");
        std::fs::write(&path, "default_priority = \"low\"\n").unwrap();
        assert_eq!(Config::load_from(&path).default_priority, Priority::Low);
    }
}
