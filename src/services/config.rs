use crate::error::ConfigError;
use crate::models::config::AppConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration manager for app settings
pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for `<platform config dir>/tracker-ocr/config.json`.
    ///
    /// Nothing is created on disk until `save` is called.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("tracker-ocr");

        Ok(Self::in_dir(config_dir))
    }

    /// Manager rooted at an explicit directory
    pub fn in_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let config_path = config_dir.join("config.json");
        Self {
            config_dir,
            config_path,
        }
    }

    /// Save configuration to disk
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir)?;

        // Pretty print for human editing
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, json)?;

        tracing::debug!(path = %self.config_path.display(), "config saved");
        Ok(())
    }

    /// Load configuration from disk
    ///
    /// If config file doesn't exist, returns default configuration
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.config_exists() {
            return Ok(AppConfig::default());
        }
        Self::load_from(&self.config_path)
    }

    /// Load a config file that must exist
    pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn config_file_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config_exists(&self) -> bool {
        self.config_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::{EngineKind, LogFormat};
    use tempfile::TempDir;

    fn create_test_manager() -> (TempDir, ConfigManager) {
        let temp = TempDir::new().unwrap();
        // Nested so save() has to create the directory
        let manager = ConfigManager::in_dir(temp.path().join("tracker-ocr"));
        (temp, manager)
    }

    #[test]
    fn test_config_manager_new() {
        match ConfigManager::new() {
            Ok(manager) => {
                assert!(manager.config_file_path().ends_with("tracker-ocr/config.json"));
            }
            // Sandboxes without a home directory
            Err(ConfigError::NoConfigDir) => {}
            Err(e) => panic!("Unexpected error: {}", e),
        }
    }

    #[test]
    fn test_config_load_default_when_not_exists() {
        let (_temp, manager) = create_test_manager();

        assert!(!manager.config_exists());
        let config = manager.load().unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_config_save_and_load() {
        let (_temp, manager) = create_test_manager();

        let mut config = AppConfig::default();
        config.engine.kind = EngineKind::Http;
        config.pipeline.max_batch_size = 4;
        config.logging.format = LogFormat::Json;

        manager.save(&config).expect("save should succeed");
        assert!(manager.config_exists(), "Config file should exist after save");

        let loaded = manager.load().expect("load should succeed");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_overwrite() {
        let (_temp, manager) = create_test_manager();

        let mut first = AppConfig::default();
        first.pipeline.max_batch_size = 2;
        manager.save(&first).unwrap();

        let mut second = AppConfig::default();
        second.pipeline.max_batch_size = 7;
        manager.save(&second).unwrap();

        assert_eq!(manager.load().unwrap().pipeline.max_batch_size, 7);
    }

    #[test]
    fn test_load_from_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let result = ConfigManager::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = ConfigManager::load_from(Path::new("/nonexistent/tracker-ocr.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
