//! Threshold parameters for the `check` subcommand

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::path::Path;

use crate::config::ConfigError;
use crate::system::FilesystemReader;

/// Upper `[warn, crit]` levels
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Levels(pub f64, pub f64);

impl Levels {
    pub fn warn(&self) -> f64 {
        self.0
    }

    pub fn crit(&self) -> f64 {
        self.1
    }

    /// Wait levels are configured in milliseconds, values are in seconds
    pub fn ms_to_seconds(self) -> Self {
        Levels(self.0 / 1000.0, self.1 / 1000.0)
    }
}

/// Keys ending in `_levels` map to `[warn, crit]` or `null`.
/// Every other key is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckParams {
    levels: HashMap<String, Levels>,
}

impl Default for CheckParams {
    fn default() -> Self {
        let mut levels = HashMap::new();
        levels.insert("storage_levels".to_string(), Levels(80.0, 90.0));
        Self { levels }
    }
}

impl CheckParams {
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let raw: HashMap<String, Value> = serde_json::from_str(content)?;
        let mut params = CheckParams::default();

        for (key, value) in raw {
            if !key.ends_with("_levels") {
                continue;
            }
            match serde_json::from_value::<Option<Levels>>(value)? {
                Some(levels) if levels.warn() > levels.crit() => {
                    return Err(ConfigError::ValidationError(format!(
                        "{}: warn level {} is above crit level {}",
                        key,
                        levels.warn(),
                        levels.crit()
                    )));
                }
                Some(levels) => {
                    params.levels.insert(key, levels);
                }
                None => {
                    params.levels.remove(&key);
                }
            }
        }

        Ok(params)
    }

    /// Levels configured for `<name>_levels`, if any
    pub fn levels(&self, name: &str) -> Option<Levels> {
        self.levels.get(&format!("{}_levels", name)).copied()
    }
}

/// Load check parameters; a missing file means defaults
pub fn load_params<F: FilesystemReader>(reader: &F, path: &Path) -> Result<CheckParams, ConfigError> {
    match reader.read_to_string(path) {
        Ok(content) => CheckParams::from_json(&content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(CheckParams::default()),
        Err(source) => Err(ConfigError::ReadError {
            path: path.display().to_string(),
            source,
        }),
    }
}
