//! Settings file discovery and loading.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::settings::Settings;
use crate::error::{ConfigError, ConfigResult};

/// File name of the settings file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Locates and loads the settings file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
    explicit: bool,
}

impl ConfigManager {
    /// Uses `<config dir>/ddwatch/config.toml`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoDirectory`] if the platform config directory
    /// cannot be determined.
    pub fn new() -> ConfigResult<Self> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoDirectory("config"))?;
        Ok(Self {
            path: dir.join("ddwatch").join(CONFIG_FILE_NAME),
            explicit: false,
        })
    }

    /// Uses an explicit settings file; it must exist when loaded
    #[must_use]
    pub fn with_config_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            explicit: true,
        }
    }

    /// Path of the settings file
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings.
    ///
    /// A missing default file yields the built-in defaults; a missing
    /// explicit file is an error. The result is not validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`], [`ConfigError::Read`] or
    /// [`ConfigError::Parse`].
    pub fn load(&self) -> ConfigResult<Settings> {
        if !self.path.exists() {
            if self.explicit {
                return Err(ConfigError::NotFound(self.path.clone()));
            }
            debug!(path = %self.path.display(), "No settings file, using defaults");
            return Ok(Settings::default());
        }

        let text = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Read {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        let settings = Settings::from_toml(&text)?;
        debug!(
            path = %self.path.display(),
            targets = settings.targets.len(),
            "Settings loaded"
        );
        Ok(settings)
    }
}
