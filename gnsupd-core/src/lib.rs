//! gnsupd core library: set types, definition scanning/loading, configuration.
//!
//! - [`types`]: `SetName`, `SetDefinition`, `RemoteSet`
//! - [`scanner`]: list set names in a definition directory
//! - [`definition`]: read one definition file
//! - [`config`]: `GNSUPD_*` environment configuration
//! - [`error`]: [`ConfigError`], [`ScanError`], [`LoadError`]

pub mod config;
pub mod definition;
pub mod error;
pub mod scanner;
pub mod types;

pub use config::{BatchConfig, LogFormat, SingleConfig, StoreConfig};
pub use error::{ConfigError, LoadError, ScanError};
pub use types::{ObjectMeta, RemoteSet, SetDefinition, SetName, SetSpec};
