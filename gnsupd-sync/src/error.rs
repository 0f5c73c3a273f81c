//! Error types for gnsupd-sync.

use std::path::PathBuf;

use thiserror::Error;

use gnsupd_core::ScanError;

/// Failures talking to the policy store. Each one fails a single set.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection, DNS, TLS, or request construction failure.
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// The store answered with a non-success status.
    #[error("policy store returned HTTP {code} for {url}: {body}")]
    Status { code: u16, url: String, body: String },

    /// The response body was not the expected object.
    #[error("failed to decode policy store response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The configured API URL cannot address the collection.
    #[error("invalid policy store URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// `get` answered with an object belonging to another set.
    #[error("policy store returned set '{returned}' when asked for '{requested}'")]
    NameMismatch { requested: String, returned: String },

    /// The bearer token file could not be read.
    #[error("failed to read API token {path}: {source}")]
    Token {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Errors that abort a whole reconciliation pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The definition directory could not be listed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// No client could be built for this pass.
    #[error("policy store unavailable: {0}")]
    Store(#[from] StoreError),
}
