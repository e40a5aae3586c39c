//! StateModel trait for typed storage
//!
//! Models convert themselves to and from the JSON form the store persists.
//! The default conversions go through serde; implementors only name their
//! collection key.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{StateError, StateResult};

/// A structured value the store can persist and reconstruct
pub trait StateModel: Serialize + DeserializeOwned {
    /// Conventional key under which a collection of this model is stored
    fn collection_name() -> &'static str;

    /// Convert to the persisted JSON form
    fn to_state(&self) -> StateResult<Value> {
        serde_json::to_value(self).map_err(|e| StateError::Serialization(e.to_string()))
    }

    /// Reconstruct from the persisted JSON form
    fn from_state(value: Value) -> StateResult<Self> {
        serde_json::from_value(value).map_err(|e| StateError::Serialization(e.to_string()))
    }
}
