//! Agent configuration: whether to collect, and how long to sample and wait

use log::debug;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::system::FilesystemReader;

/// File name looked up inside the agent configuration directory
pub const CONFIG_FILE_NAME: &str = "zpool_iostat.json";

/// Used when `MK_CONFDIR` is not set
pub const DEFAULT_CONFIG_DIR: &str = "/etc/check_mk";

/// Extra time the command gets on top of its sampling window
pub const TIMEOUT_SAFETY_MARGIN_SECS: u64 = 5;

/// Errors that can occur during configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),
}

/// Options read from the agent's JSON configuration file.
/// Unknown keys are ignored and missing keys fall back to defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub enabled: bool,
    /// Seconds before the zpool command is killed
    pub timeout: u64,
    /// Seconds zpool iostat averages over before printing
    pub sampling_duration: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: 30,
            sampling_duration: 10,
        }
    }
}

impl AgentConfig {
    /// Parse and validate configuration from JSON text
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling_duration == 0 {
            return Err(ConfigError::ValidationError(
                "sampling_duration must be a positive number of seconds".to_string(),
            ));
        }
        if self.timeout == 0 {
            return Err(ConfigError::ValidationError(
                "timeout must be a positive number of seconds".to_string(),
            ));
        }
        let minimum = self.sampling_duration.saturating_add(TIMEOUT_SAFETY_MARGIN_SECS);
        if self.timeout <= minimum {
            return Err(ConfigError::ValidationError(format!(
                "timeout ({}s) must exceed sampling_duration ({}s) plus {}s",
                self.timeout, self.sampling_duration, TIMEOUT_SAFETY_MARGIN_SECS
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Resolve the config path: `$MK_CONFDIR/zpool_iostat.json`, else the default directory
pub fn default_config_path() -> PathBuf {
    let dir = std::env::var_os("MK_CONFDIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR));
    dir.join(CONFIG_FILE_NAME)
}

/// Load configuration through the given reader. A missing file means defaults.
pub fn load_config<F: FilesystemReader>(
    reader: &F,
    path: &Path,
) -> Result<AgentConfig, ConfigError> {
    match reader.read_to_string(path) {
        Ok(content) => AgentConfig::from_json(&content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No config at {}, using defaults", path.display());
            Ok(AgentConfig::default())
        }
        Err(source) => Err(ConfigError::ReadError {
            path: path.display().to_string(),
            source,
        }),
    }
}
