//! `gnsupd daemon` / `gnsupd single`: long-running trigger loop.

use anyhow::{Context, Result};

use gnsupd_core::{BatchConfig, SingleConfig, StoreConfig};
use gnsupd_daemon::start_blocking;
use gnsupd_sync::pipeline::PassScope;

pub fn run_batch() -> Result<()> {
    let config = BatchConfig::from_env().context("failed to initialize")?;
    let store = StoreConfig::from_env().context("failed to initialize")?;
    start_blocking(PassScope::from(config), store).context("daemon exited with error")
}

pub fn run_single() -> Result<()> {
    let config = SingleConfig::from_env().context("failed to initialize")?;
    let store = StoreConfig::from_env().context("failed to initialize")?;
    start_blocking(PassScope::from(config), store).context("daemon exited with error")
}
