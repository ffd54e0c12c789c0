//! Boot configuration loader.
//!
//! Implements [`ConfigPort`]. The configuration is the compile-time
//! defaults from [`SystemConfig::default`], optionally replaced by a JSON
//! document on hosts where a filesystem is available. Whatever the source,
//! the value is validated before it is handed out.

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

/// Environment variable naming a JSON config file (host builds).
pub const CONFIG_PATH_ENV: &str = "WEATHERSTATION_CONFIG";

#[derive(Debug, Default, Clone)]
pub struct BootConfigLoader {
    path: Option<String>,
}

impl BootConfigLoader {
    /// Compile-time defaults only.
    pub fn defaults() -> Self {
        Self { path: None }
    }

    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Use `WEATHERSTATION_CONFIG` when it is set.
    pub fn from_env() -> Self {
        Self {
            path: std::env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.is_empty()),
        }
    }

    fn read(&self) -> Result<SystemConfig, ConfigError> {
        let Some(path) = &self.path else {
            return Ok(SystemConfig::default());
        };
        let text = std::fs::read_to_string(path).map_err(|e| {
            warn!("Config: cannot read {}: {}", path, e);
            match e.kind() {
                std::io::ErrorKind::NotFound => ConfigError::NotFound,
                _ => ConfigError::IoError,
            }
        })?;
        let config = parse(&text)?;
        info!("Config: loaded {}", path);
        Ok(config)
    }
}

/// Parse a JSON document into a [`SystemConfig`] (not yet validated).
pub fn parse(text: &str) -> Result<SystemConfig, ConfigError> {
    serde_json::from_str(text).map_err(|e| {
        warn!("Config: parse error: {}", e);
        ConfigError::Corrupted
    })
}

impl ConfigPort for BootConfigLoader {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let config = self.read()?;
        config.validate()?;
        Ok(config)
    }
}
