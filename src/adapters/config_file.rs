//! JSON config file adapter.
//!
//! Implements [`ConfigPort`] over a single JSON file. Every load and save is
//! validated; invalid values are rejected rather than clamped.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::AssistantConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "PILAMP_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "pilamp.json";

pub struct FileConfigAdapter {
    path: PathBuf,
}

impl FileConfigAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$PILAMP_CONFIG`, or `./pilamp.json`.
    pub fn from_env() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load, falling back to defaults on any error. Never fails.
    pub fn load_or_default(&self) -> AssistantConfig {
        match self.load() {
            Ok(config) => config,
            Err(ConfigError::NotFound) => {
                info!("config: {} not found, using defaults", self.path.display());
                AssistantConfig::default()
            }
            Err(e) => {
                warn!("config: {} ({}), using defaults", e, self.path.display());
                AssistantConfig::default()
            }
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn load(&self) -> Result<AssistantConfig, ConfigError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound);
            }
            Err(e) => return Err(ConfigError::Io(e.to_string())),
        };
        let config: AssistantConfig =
            serde_json::from_str(&text).map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        config.validate()?;
        info!("config: loaded {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &AssistantConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| ConfigError::Io(e.to_string()))?;
        info!("config: saved {}", self.path.display());
        Ok(())
    }
}
