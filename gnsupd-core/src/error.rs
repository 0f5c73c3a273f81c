//! Error types for gnsupd-core.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or incomplete process configuration. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable was not set (or was empty).
    #[error("required configuration variable {var} is not set")]
    Missing { var: String },

    /// A variable was set to a value that cannot be used.
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// The definition directory could not be listed. Aborts the whole pass.
#[derive(Debug, Error)]
#[error("failed to scan definition directory {path}: {source}")]
pub struct ScanError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// A single definition file could not be turned into a [`crate::SetDefinition`].
/// Skips that one set; the rest of the pass continues.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File missing, unreadable, or not valid UTF-8.
    #[error("failed to read definition {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not a JSON object with an array of strings under `nets`.
    #[error("failed to parse definition {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::Read { path, .. } | LoadError::Parse { path, .. } => path,
        }
    }
}
