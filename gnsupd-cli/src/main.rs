//! gnsupd: keep Calico GlobalNetworkSets in step with local JSON files.
//!
//! # Usage
//!
//! ```text
//! gnsupd daemon            # every *.json in $GNSUPD_CONFIG_DIR, re-run on SIGHUP
//! gnsupd single            # $GNSUPD_NETWORKS_FILE -> $GNSUPD_SET_NAME, re-run on SIGHUP
//! gnsupd sync [--dry-run]  # one directory pass, then exit
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::sync::SyncArgs;
use gnsupd_core::LogFormat;

#[derive(Parser, Debug)]
#[command(
    name = "gnsupd",
    version,
    about = "Synchronize Calico GlobalNetworkSets with local JSON definitions",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the directory daemon (GNSUPD_CONFIG_DIR, GNSUPD_EXTRA_LABEL).
    Daemon,

    /// Run the single-set daemon (GNSUPD_NETWORKS_FILE, GNSUPD_SET_NAME).
    Single,

    /// Reconcile the definition directory once and exit.
    Sync(SyncArgs),
}

fn main() -> Result<()> {
    // Logging comes first so configuration failures are always reported.
    match LogFormat::from_env() {
        Ok(format) => gnsupd_daemon::init_tracing(format),
        Err(err) => {
            gnsupd_daemon::init_tracing(LogFormat::Text);
            tracing::warn!(error = %err, "falling back to text log format");
        }
    }

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Daemon => commands::daemon::run_batch(),
        Commands::Single => commands::daemon::run_single(),
        Commands::Sync(args) => args.run(),
    };
    if let Err(err) = &result {
        tracing::error!(error = %format!("{err:#}"), "gnsupd failed");
    }
    result
}
