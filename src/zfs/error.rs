use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;

/// Outcomes of one collection cycle that end it without pool records
#[derive(Error, Debug)]
pub enum CollectError {
    /// `zpool` binary is not installed; monitoring is silently disabled
    #[error("collector unavailable: {command} not found")]
    Unavailable { command: String },

    /// Command did not finish within the configured timeout
    #[error("collection timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Command exited non-zero, stderr is kept verbatim
    #[error("collection failed (exit code {code:?}): {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    /// Command ran fine but printed no pool lines
    #[error("no pools found")]
    NoPoolsFound,

    /// Spawning or reading the command failed for another reason
    #[error("collection failed: {reason}")]
    Io { reason: String },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CollectError {
    pub fn unavailable(command: &str) -> Self {
        CollectError::Unavailable {
            command: command.to_string(),
        }
    }

    pub fn failed(code: Option<i32>, stderr: &str) -> Self {
        CollectError::Failed {
            code,
            stderr: stderr.trim_end().to_string(),
        }
    }

    /// Whether the outcome must surface as an error state downstream.
    /// Unavailable binaries and empty pool lists are valid quiet states.
    pub fn is_reported(&self) -> bool {
        !matches!(
            self,
            CollectError::Unavailable { .. } | CollectError::NoPoolsFound
        )
    }

    /// Text placed on the `ERROR|` line. A failed command reports its
    /// stderr unchanged so the operator sees exactly what zpool said.
    pub fn diagnostic(&self) -> String {
        match self {
            CollectError::Failed { stderr, .. } if !stderr.is_empty() => stderr.clone(),
            other => other.to_string(),
        }
    }
}

/// A data line that could not be aligned with its header
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineError {
    #[error("header/data column mismatch: header has {expected} columns, line has {found}")]
    HeaderMismatch { expected: usize, found: usize },

    #[error("no header line precedes data")]
    MissingHeader,
}

/// A single token that could not be converted for its column
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot parse {field} value '{token}': {reason}")]
pub struct FieldParseError {
    pub field: String,
    pub token: String,
    pub reason: String,
}

impl FieldParseError {
    pub fn new(field: &str, token: &str, reason: &str) -> Self {
        FieldParseError {
            field: field.to_string(),
            token: token.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for collection operations
pub type CollectResult<T> = Result<T, CollectError>;
