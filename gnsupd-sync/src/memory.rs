//! In-memory [`SetRepository`] for tests.
//!
//! Only built for this crate's own tests or with the `test-support` feature.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use gnsupd_core::types::{RemoteSet, SetName};

use crate::error::StoreError;
use crate::repository::SetRepository;

/// One recorded call against a [`MemoryRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    Get(SetName),
    Create(SetName),
    Update(SetName),
}

#[derive(Debug, Default)]
struct MemoryState {
    sets: BTreeMap<SetName, RemoteSet>,
    calls: Vec<RepoCall>,
    next_version: u64,
    failing_gets: HashSet<SetName>,
    failing_writes: HashSet<SetName>,
}

/// Process-local store that behaves like the API server: it assigns
/// `uid`/`resourceVersion`, rejects duplicate creates and stale updates, and
/// leaves the version untouched on a no-op update.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store `set` as-is, bypassing version assignment.
    pub fn insert(&self, set: RemoteSet) {
        self.lock().sets.insert(set.metadata.name.clone(), set);
    }

    pub fn snapshot(&self, name: &SetName) -> Option<RemoteSet> {
        self.lock().sets.get(name).cloned()
    }

    pub fn names(&self) -> Vec<SetName> {
        self.lock().sets.keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<RepoCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Make every `get` for `name` fail with HTTP 503.
    pub fn fail_gets_for(&self, name: impl Into<SetName>) {
        self.lock().failing_gets.insert(name.into());
    }

    /// Make every `create`/`update` for `name` fail with HTTP 422.
    pub fn fail_writes_for(&self, name: impl Into<SetName>) {
        self.lock().failing_writes.insert(name.into());
    }
}

/// Metadata the store owns; client-sent values are ignored on update.
const SERVER_OWNED: &[&str] = &["uid", "creationTimestamp"];

fn memory_error(code: u16, name: &SetName, body: &str) -> StoreError {
    StoreError::Status {
        code,
        url: format!("memory://globalnetworksets/{name}"),
        body: body.to_string(),
    }
}

impl SetRepository for MemoryRepository {
    fn get(&self, name: &SetName) -> Result<Option<RemoteSet>, StoreError> {
        let mut state = self.lock();
        state.calls.push(RepoCall::Get(name.clone()));
        if state.failing_gets.contains(name) {
            return Err(memory_error(503, name, "service unavailable"));
        }
        Ok(state.sets.get(name).cloned())
    }

    fn create(&self, set: &RemoteSet) -> Result<RemoteSet, StoreError> {
        let name = set.name().clone();
        let mut state = self.lock();
        state.calls.push(RepoCall::Create(name.clone()));
        if state.failing_writes.contains(&name) {
            return Err(memory_error(422, &name, "invalid nets"));
        }
        if state.sets.contains_key(&name) {
            return Err(memory_error(409, &name, "already exists"));
        }

        state.next_version += 1;
        let version = state.next_version;
        let mut stored = set.clone();
        stored
            .metadata
            .extra
            .insert("uid".into(), Value::String(format!("uid-{name}")));
        stored
            .metadata
            .extra
            .insert("resourceVersion".into(), Value::String(version.to_string()));
        state.sets.insert(name, stored.clone());
        Ok(stored)
    }

    fn update(&self, set: &RemoteSet) -> Result<RemoteSet, StoreError> {
        let name = set.name().clone();
        let mut state = self.lock();
        state.calls.push(RepoCall::Update(name.clone()));
        if state.failing_writes.contains(&name) {
            return Err(memory_error(422, &name, "invalid nets"));
        }
        let Some(current) = state.sets.get(&name).cloned() else {
            return Err(memory_error(404, &name, "not found"));
        };
        if set.metadata.resource_version().is_some()
            && set.metadata.resource_version() != current.metadata.resource_version()
        {
            return Err(memory_error(409, &name, "resource version conflict"));
        }
        if current.spec == set.spec && current.metadata.labels == set.metadata.labels {
            return Ok(current);
        }

        state.next_version += 1;
        let version = state.next_version;
        let mut stored = set.clone();
        for key in SERVER_OWNED {
            match current.metadata.extra.get(*key) {
                Some(value) => stored.metadata.extra.insert(key.to_string(), value.clone()),
                None => stored.metadata.extra.remove(*key),
            };
        }
        stored
            .metadata
            .extra
            .insert("resourceVersion".into(), Value::String(version.to_string()));
        state.sets.insert(name, stored.clone());
        Ok(stored)
    }
}
