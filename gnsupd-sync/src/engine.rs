//! Reconciliation of local definitions into the policy store.
//!
//! For each set, in scan order and one at a time:
//!
//! 1. load the definition file
//! 2. `get` the remote object
//! 3. `None` → `create` a fresh object with labels and payload;
//!    `Some` → copy the payload into the fetched object and `update`
//!
//! Failures in any step are recorded against that set only. The only thing
//! that stops a batch pass is failing to list the directory.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use gnsupd_core::{
    definition, scanner,
    types::{RemoteSet, SetDefinition, SetName},
    LoadError, ScanError,
};

use crate::error::{StoreError, SyncError};
use crate::repository::SetRepository;

/// Step at which a set failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Load,
    Get,
    Create,
    Update,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Load => write!(f, "load"),
            Stage::Get => write!(f, "get"),
            Stage::Create => write!(f, "create"),
            Stage::Update => write!(f, "update"),
        }
    }
}

/// Result of reconciling one set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ItemOutcome {
    Created,
    Updated,
    Failed { stage: Stage, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub name: SetName,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

/// Everything that happened during one pass. Per-set failures live here
/// rather than in an `Err`.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub items: Vec<ItemReport>,
    pub duration_ms: u128,
}

impl PassReport {
    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Created))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Updated))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Failed { .. }))
    }

    pub fn outcome_of(&self, name: &str) -> Option<&ItemOutcome> {
        self.items
            .iter()
            .find(|i| i.name.as_str() == name)
            .map(|i| &i.outcome)
    }
}

struct PassTimer {
    started_at: DateTime<Utc>,
    started: Instant,
}

impl PassTimer {
    fn start() -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    fn finish(self, items: Vec<ItemReport>) -> PassReport {
        PassReport {
            started_at: self.started_at,
            items,
            duration_ms: self.started.elapsed().as_millis(),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Reconcile every `*.json` definition in `dir`.
///
/// Returns `Err` only when `dir` cannot be listed; in that case nothing is
/// sent to the store.
pub fn reconcile_all<R: SetRepository + ?Sized>(
    dir: &Path,
    extra_label: Option<&str>,
    repo: &R,
) -> Result<PassReport, SyncError> {
    let timer = PassTimer::start();
    let names = scanner::scan_dir(dir)?;
    tracing::debug!(dir = %dir.display(), count = names.len(), "scanned definition directory");

    let items = names
        .into_iter()
        .map(|name| {
            let path = scanner::definition_path(dir, &name);
            let loaded = definition::load_definition(&path, name.clone(), extra_label);
            reconcile_item(name, loaded, repo)
        })
        .collect();
    Ok(timer.finish(items))
}

/// Reconcile a single fixed file into the set `name`. No extra label.
pub fn reconcile_one<R: SetRepository + ?Sized>(
    file: &Path,
    name: &SetName,
    repo: &R,
) -> PassReport {
    let timer = PassTimer::start();
    let loaded = definition::load_definition(file, name.clone(), None);
    let item = reconcile_item(name.clone(), loaded, repo);
    timer.finish(vec![item])
}

/// Objects `reconcile_all` would submit for a fresh store, without
/// contacting one. Load failures are reported per set.
pub fn candidates(
    dir: &Path,
    extra_label: Option<&str>,
) -> Result<Vec<(SetName, Result<RemoteSet, LoadError>)>, ScanError> {
    Ok(scanner::scan_dir(dir)?
        .into_iter()
        .map(|name| {
            let path = scanner::definition_path(dir, &name);
            let candidate = definition::load_definition(&path, name.clone(), extra_label)
                .map(|def| def.to_remote());
            (name, candidate)
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Per-set pipeline
// ---------------------------------------------------------------------------

fn reconcile_item<R: SetRepository + ?Sized>(
    name: SetName,
    loaded: Result<SetDefinition, LoadError>,
    repo: &R,
) -> ItemReport {
    let outcome = match loaded {
        Err(err) => {
            tracing::error!(set = %name, path = %err.path().display(), error = %err, "failed to load set definition");
            ItemOutcome::Failed {
                stage: Stage::Load,
                error: err.to_string(),
            }
        }
        Ok(definition) => match upsert(&definition, repo) {
            Ok(outcome) => {
                let action = match outcome {
                    ItemOutcome::Created => "created",
                    _ => "updated",
                };
                tracing::info!(
                    set = %name,
                    nets = definition.networks.len(),
                    action,
                    "reconciled network set",
                );
                outcome
            }
            Err((stage, err)) => {
                tracing::error!(set = %name, stage = %stage, error = %err, "failed to reconcile network set");
                ItemOutcome::Failed {
                    stage,
                    error: err.to_string(),
                }
            }
        },
    };
    ItemReport { name, outcome }
}

/// Create if absent, otherwise merge the payload into the fetched object.
pub fn upsert<R: SetRepository + ?Sized>(
    definition: &SetDefinition,
    repo: &R,
) -> Result<ItemOutcome, (Stage, StoreError)> {
    match repo.get(&definition.name).map_err(|e| (Stage::Get, e))? {
        None => {
            repo.create(&definition.to_remote())
                .map_err(|e| (Stage::Create, e))?;
            Ok(ItemOutcome::Created)
        }
        Some(existing) if existing.name() != &definition.name => Err((
            Stage::Get,
            StoreError::NameMismatch {
                requested: definition.name.to_string(),
                returned: existing.name().to_string(),
            },
        )),
        Some(existing) => {
            repo.update(&existing.with_payload(definition))
                .map_err(|e| (Stage::Update, e))?;
            Ok(ItemOutcome::Updated)
        }
    }
}
