//! Configuration management for abhyas

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shared secret for the edit-mode gate
    ///
    /// A convenience lock, not a credential: it lives in a plain-text config
    /// file and gates nothing but the in-app undo policy.
    pub admin_secret: String,

    /// Path to a custom syllabus catalog; the embedded one is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self { admin_secret: "1234".to_string(), catalog_path: None }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse config.json")
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "abhyas").context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "abhyas").context("Failed to determine data directory")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_a_secret() {
        let config = Config::default();
        assert!(!config.admin_secret.is_empty());
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn config_serializes_without_unset_catalog_path() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("admin_secret"));
        assert!(!json.contains("catalog_path"));
    }

    #[test]
    fn config_deserializes_from_json() {
        let json = r#"{"admin_secret":"sesame","catalog_path":"/tmp/syllabus.json"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.admin_secret, "sesame");
        assert_eq!(config.catalog_path, Some(PathBuf::from("/tmp/syllabus.json")));
    }
}
