//! StateManager - in-process key-value store
//!
//! String keys map to JSON values. With persistence configured, every
//! mutation writes the full key space through to the snapshot file. Lookups
//! never fail: a missing key yields `None` or the caller's default, and a
//! stored value that does not match the requested model yields `None` with a
//! warning.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StateResult;
use crate::model::StateModel;
use crate::persist::Snapshot;

/// Shared key-value store with optional snapshot persistence
pub struct StateManager {
    entries: RwLock<HashMap<String, Value>>,
    snapshot: Option<Snapshot>,
}

impl StateManager {
    /// Create a store with no persistence
    pub fn in_memory() -> Self {
        debug!("Created in-memory state manager");
        Self {
            entries: RwLock::new(HashMap::new()),
            snapshot: None,
        }
    }

    /// Open a store backed by the snapshot file at `path`
    ///
    /// Loads prior state when the file exists; a corrupt file is moved aside
    /// and the store starts empty. Fails when another manager already owns
    /// the file or its parent directory cannot be created.
    pub fn open(path: impl AsRef<Path>) -> StateResult<Self> {
        let snapshot = Snapshot::acquire(path.as_ref())?;
        let entries = snapshot.load();
        Ok(Self {
            entries: RwLock::new(entries),
            snapshot: Some(snapshot),
        })
    }

    // === Raw value operations ===

    /// Store a value under `key`, overwriting any previous value
    ///
    /// A `Value::Null` value removes the key: callers cannot distinguish a
    /// null entry from a missing one, so the store does not keep them.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        debug!(%key, "Set state value");
        let mut entries = self.write_entries();
        if value.is_null() {
            entries.remove(&key);
        } else {
            entries.insert(key.clone(), value);
        }
        self.write_through(&entries, "set", &key);
    }

    /// Get a clone of the value under `key`, or `None` when absent
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read_entries().get(key).cloned()
    }

    /// Get the value under `key`, or `default` when absent
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    /// Remove `key`, returning whether a value was actually removed
    pub fn delete(&self, key: &str) -> bool {
        debug!(%key, "Delete state value");
        let mut entries = self.write_entries();
        let removed = entries.remove(key).is_some();
        if removed {
            self.write_through(&entries, "delete", key);
        }
        removed
    }

    /// All currently stored keys, in no particular order
    pub fn keys(&self) -> Vec<String> {
        self.read_entries().keys().cloned().collect()
    }

    /// Remove every key and persist the empty state
    pub fn clear(&self) {
        debug!("Clear state");
        let mut entries = self.write_entries();
        entries.clear();
        self.write_through(&entries, "clear", "*");
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// Whether `key` currently holds a value
    pub fn contains_key(&self, key: &str) -> bool {
        self.read_entries().contains_key(key)
    }

    // === Typed model operations ===

    /// Store a model under `key` in its persisted form
    pub fn set_model<M: StateModel>(&self, key: impl Into<String>, model: &M) -> StateResult<()> {
        let value = model.to_state()?;
        self.set(key, value);
        Ok(())
    }

    /// Reconstruct a model from the value under `key`
    ///
    /// Returns `None` when the key is absent or the stored value does not
    /// match the requested type.
    pub fn get_model<M: StateModel>(&self, key: &str) -> Option<M> {
        let value = self.get(key)?;
        match M::from_state(value) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!(%key, error = %e, "Stored value does not match requested model");
                None
            }
        }
    }

    /// Load the collection stored under `key`
    ///
    /// A missing key yields an empty vec. Entries that fail to convert are
    /// skipped with a warning rather than failing the whole read.
    pub fn get_collection<M: StateModel>(&self, key: &str) -> Vec<M> {
        let Some(value) = self.get(key) else {
            return Vec::new();
        };
        let Value::Array(items) = value else {
            warn!(%key, "Stored value is not a collection");
            return Vec::new();
        };
        items
            .into_iter()
            .filter_map(|item| match M::from_state(item) {
                Ok(model) => Some(model),
                Err(e) => {
                    warn!(%key, error = %e, "Skipping collection entry that does not match model");
                    None
                }
            })
            .collect()
    }

    /// Store `items` as the collection under `key`, replacing it entirely
    pub fn set_collection<M: StateModel>(&self, key: impl Into<String>, items: &[M]) -> StateResult<()> {
        let values = items.iter().map(|item| item.to_state()).collect::<StateResult<Vec<Value>>>()?;
        self.set(key, Value::Array(values));
        Ok(())
    }

    // === Persistence ===

    /// Flush the current state to the snapshot file, surfacing any error
    ///
    /// The write-through path logs and swallows persistence failures; callers
    /// that need to observe them use this instead.
    pub fn persist_now(&self) -> StateResult<()> {
        if let Some(snapshot) = &self.snapshot {
            snapshot.save(&self.read_entries())?;
        }
        Ok(())
    }

    fn write_through(&self, entries: &HashMap<String, Value>, op: &str, key: &str) {
        if let Some(snapshot) = &self.snapshot
            && let Err(e) = snapshot.save(entries)
        {
            warn!(%op, %key, error = %e, "State write-through failed, in-memory value kept");
        }
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, Value>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}
