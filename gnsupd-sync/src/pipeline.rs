//! Shared pass entrypoint used by the CLI and the daemon worker.

use std::path::PathBuf;

use gnsupd_core::{config::StoreConfig, types::SetName, BatchConfig, SingleConfig};

use crate::calico::CalicoRepository;
use crate::engine::{self, PassReport};
use crate::error::SyncError;
use crate::repository::SetRepository;

/// What a pass reconciles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassScope {
    /// Every definition in a directory.
    All {
        dir: PathBuf,
        extra_label: Option<String>,
    },
    /// One fixed file into one fixed set.
    Single { file: PathBuf, name: SetName },
}

impl PassScope {
    pub fn label(&self) -> String {
        match self {
            PassScope::All { dir, .. } => format!("dir:{}", dir.display()),
            PassScope::Single { name, .. } => format!("set:{name}"),
        }
    }
}

impl From<BatchConfig> for PassScope {
    fn from(config: BatchConfig) -> Self {
        PassScope::All {
            dir: config.config_dir,
            extra_label: config.extra_label,
        }
    }
}

impl From<SingleConfig> for PassScope {
    fn from(config: SingleConfig) -> Self {
        PassScope::Single {
            file: config.networks_file,
            name: config.set_name,
        }
    }
}

/// Run one pass for `scope` against `repo`.
pub fn run_with<R: SetRepository + ?Sized>(
    scope: &PassScope,
    repo: &R,
) -> Result<PassReport, SyncError> {
    match scope {
        PassScope::All { dir, extra_label } => {
            engine::reconcile_all(dir, extra_label.as_deref(), repo)
        }
        PassScope::Single { file, name } => Ok(engine::reconcile_one(file, name, repo)),
    }
}

/// Run one pass against the policy store, with a client built for this pass only.
pub fn run(scope: &PassScope, store: &StoreConfig) -> Result<PassReport, SyncError> {
    let repo = CalicoRepository::connect(store)?;
    run_with(scope, &repo)
}
