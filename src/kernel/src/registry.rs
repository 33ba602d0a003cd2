//! Name-keyed registry shared by every bank.
//!
//! Each bank owns one [`Registry`] mapping entity names to records. The
//! registry is what turns a missing name into [`SimError::NotFound`] and a
//! duplicate create into [`SimError::AlreadyExists`] when the bank runs with
//! [`CreatePolicy::Reject`].

use std::collections::BTreeMap;

use rtsim_common::{EntityKind, Result, SimError};
use serde::Deserialize;

/// What `create` does when the name is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatePolicy {
    /// Replace the existing record.
    #[default]
    Overwrite,
    /// Fail with `AlreadyExists` and leave the existing record alone.
    Reject,
}

/// Owned map from entity name to record.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    kind: EntityKind,
    policy: CreatePolicy,
    entries: BTreeMap<String, T>,
}

impl<T> Registry<T> {
    /// Create an empty registry for entities of `kind`.
    pub fn new(kind: EntityKind, policy: CreatePolicy) -> Self {
        Self {
            kind,
            policy,
            entries: BTreeMap::new(),
        }
    }

    /// Kind of entity this registry holds.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Active create policy.
    pub fn policy(&self) -> CreatePolicy {
        self.policy
    }

    /// Insert a record, honouring the create policy.
    pub fn insert(&mut self, name: &str, record: T) -> Result<()> {
        if self.entries.contains_key(name) {
            match self.policy {
                CreatePolicy::Reject => return Err(SimError::already_exists(self.kind, name)),
                CreatePolicy::Overwrite => {
                    log::warn!("{} '{}' already exists, replacing it.", self.kind, name);
                }
            }
        }
        self.entries.insert(name.to_string(), record);
        Ok(())
    }

    /// Look up a record by name.
    pub fn get(&self, name: &str) -> Result<&T> {
        self.entries
            .get(name)
            .ok_or_else(|| SimError::not_found(self.kind, name))
    }

    /// Look up a record by name for mutation.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut T> {
        let kind = self.kind;
        self.entries
            .get_mut(name)
            .ok_or_else(|| SimError::not_found(kind, name))
    }

    /// Remove a record, returning it.
    pub fn remove(&mut self, name: &str) -> Result<T> {
        self.entries
            .remove(name)
            .ok_or_else(|| SimError::not_found(self.kind, name))
    }

    /// Whether a record with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no records are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
