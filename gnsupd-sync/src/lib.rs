//! # gnsupd-sync
//!
//! Reconciliation engine and policy store clients.
//!
//! Call [`engine::reconcile_all`] to push every definition in a directory, or
//! [`engine::reconcile_one`] for one fixed file. [`pipeline::run`] wraps both
//! behind a [`pipeline::PassScope`] and builds a fresh store client per pass.

pub mod calico;
pub mod engine;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod pipeline;
pub mod repository;

pub use calico::CalicoRepository;
pub use engine::{reconcile_all, reconcile_one, ItemOutcome, ItemReport, PassReport, Stage};
pub use error::{StoreError, SyncError};
#[cfg(any(test, feature = "test-support"))]
pub use memory::{MemoryRepository, RepoCall};
pub use repository::SetRepository;
