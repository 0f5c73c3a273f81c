//! Policy store boundary.
//!
//! [`SetRepository`] is the only way the engine touches remote state. `get`
//! separates "does not exist" (`Ok(None)`) from "could not find out" (`Err`),
//! so a flaky store never turns into a spurious create.

use gnsupd_core::types::{RemoteSet, SetName};

use crate::error::StoreError;

/// Get/Create/Update of network sets keyed by name.
pub trait SetRepository {
    /// Fetch the current object, or `None` if no set has this name.
    fn get(&self, name: &SetName) -> Result<Option<RemoteSet>, StoreError>;

    /// Create a new set. Returns the object as stored.
    fn create(&self, set: &RemoteSet) -> Result<RemoteSet, StoreError>;

    /// Replace an existing set. `set` must carry the metadata obtained from
    /// [`SetRepository::get`]. Returns the object as stored.
    fn update(&self, set: &RemoteSet) -> Result<RemoteSet, StoreError>;
}
