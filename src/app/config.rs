//! Configuration Management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::smoothing::SmoothingConfig;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Landmark smoothing settings
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    /// Session settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Exercise library settings
    #[serde(default)]
    pub library: LibraryConfig,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Hold duration (seconds) used when an exercise omits its own
    pub default_hold_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_hold_secs: 10,
        }
    }
}

/// Exercise library configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// JSON file replacing the built-in exercises, when set
    pub path: Option<PathBuf>,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.smoothing.history == 0 || self.smoothing.history > 30 {
            return Err(crate::Error::Config(format!(
                "smoothing.history must be in [1, 30], got {}",
                self.smoothing.history
            )));
        }
        if !(0.0..1.0).contains(&self.smoothing.alpha) {
            return Err(crate::Error::Config(format!(
                "smoothing.alpha must be in [0, 1), got {}",
                self.smoothing.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing.visibility_gate) {
            return Err(crate::Error::Config(format!(
                "smoothing.visibility_gate must be in [0, 1], got {}",
                self.smoothing.visibility_gate
            )));
        }
        if self.session.default_hold_secs == 0 {
            return Err(crate::Error::Config(
                "session.default_hold_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;

        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".pose_coach").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}
