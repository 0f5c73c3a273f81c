//! Environment configuration.
//!
//! Every variable carries the `GNSUPD_` prefix. Parsing goes through a lookup
//! function so tests never touch the process environment:
//!
//! - `from_lookup(|key| ...)`: explicit source; used in tests
//! - `from_env()`: reads `std::env`, delegates to `from_lookup`
//!
//! Empty values are treated as unset.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::types::SetName;

pub const ENV_PREFIX: &str = "GNSUPD_";
pub const DEFAULT_CONFIG_DIR: &str = "/etc/ipsets";
/// Local `kubectl proxy` endpoint, used outside a cluster.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8001";
pub const SERVICE_ACCOUNT_TOKEN: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

fn var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.is_empty())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, ConfigError> {
    var(lookup, name).ok_or_else(|| ConfigError::Missing {
        var: format!("{ENV_PREFIX}{name}"),
    })
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// Batch variant: every `*.json` in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub config_dir: PathBuf,
    pub extra_label: Option<String>,
}

impl BatchConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            config_dir: var(&lookup, "CONFIG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            extra_label: var(&lookup, "EXTRA_LABEL"),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }
}

/// Single-set variant: one fixed file and set name, both required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleConfig {
    pub networks_file: PathBuf,
    pub set_name: SetName,
}

impl SingleConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            networks_file: PathBuf::from(required(&lookup, "NETWORKS_FILE")?),
            set_name: SetName::from(required(&lookup, "SET_NAME")?),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }
}

// ---------------------------------------------------------------------------
// Policy store connection
// ---------------------------------------------------------------------------

/// Where and how to reach the policy store API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base URL without trailing slash.
    pub api_url: String,
    /// Bearer token file, re-read whenever a client is built.
    pub token_file: Option<PathBuf>,
}

impl StoreConfig {
    /// `GNSUPD_API_URL`, else the in-cluster service address when
    /// `KUBERNETES_SERVICE_HOST`/`_PORT` are set, else [`DEFAULT_API_URL`].
    /// `GNSUPD_TOKEN_FILE`, else the service-account token if it exists.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = match var(&lookup, "API_URL") {
            Some(url) => url,
            None => match (
                lookup("KUBERNETES_SERVICE_HOST").filter(|v| !v.is_empty()),
                lookup("KUBERNETES_SERVICE_PORT").filter(|v| !v.is_empty()),
            ) {
                (Some(host), Some(port)) => format!("https://{host}:{port}"),
                _ => DEFAULT_API_URL.to_string(),
            },
        };
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: format!("{ENV_PREFIX}API_URL"),
                reason: format!("'{api_url}' is not an http(s) URL"),
            });
        }

        let token_file = var(&lookup, "TOKEN_FILE").map(PathBuf::from).or_else(|| {
            let default = PathBuf::from(SERVICE_ACCOUNT_TOKEN);
            default.exists().then_some(default)
        });

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token_file,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }
}

/// Log output format selected by `GNSUPD_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match var(&lookup, "LOG_FORMAT").as_deref() {
            None | Some("text") => Ok(LogFormat::Text),
            Some("json") => Ok(LogFormat::Json),
            Some(other) => Err(ConfigError::Invalid {
                var: format!("{ENV_PREFIX}LOG_FORMAT"),
                reason: format!("expected 'text' or 'json', got '{other}'"),
            }),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }
}
