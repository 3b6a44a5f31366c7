//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] on top of a single JSON file.
//!
//! - A missing file is not an error: defaults are returned.
//! - Values are validated on load and before save.
//! - Saves write a sibling temp file and rename it over the target, so a
//!   crash mid-write never leaves a truncated config behind.

use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `config` to a file that does not exist yet.
    pub fn create(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        if self.path.exists() {
            return Err(ConfigError::IoError(format!(
                "{} already exists",
                self.path.display()
            )));
        }
        self.save(config)
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        if !self.path.exists() {
            info!("CONFIG | {} not found, using defaults", self.path.display());
            return Ok(SystemConfig::default());
        }
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: SystemConfig =
            serde_json::from_str(&text).map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        config.validate()?;
        info!("CONFIG | loaded {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::Corrupted(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| ConfigError::IoError(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        info!("CONFIG | saved {}", self.path.display());
        Ok(())
    }
}
