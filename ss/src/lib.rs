//! StateStore - generic persistent state management
//!
//! An in-process key-value store mapping string keys to JSON values, with
//! optional write-through snapshot persistence and typed accessors for
//! structured models. Lookups soft-fail: missing keys yield defaults and
//! values that do not match the requested model yield `None`.
//!
//! # Architecture
//!
//! ```text
//! StateManager
//! ├── entries: key -> JSON value       (in memory, behind an RwLock)
//! └── snapshot: state.json             (optional, rewritten on every mutation)
//!     ├── state.json.tmp               # atomic write staging
//!     ├── state.json.lock              # single-owner advisory lock
//!     └── state.json.corrupted.{ms}    # unreadable snapshots, moved aside
//! ```
//!
//! # Example
//!
//! ```ignore
//! use statestore::StateManager;
//!
//! let state = StateManager::open(".matman/state.json")?;
//! state.set("counter", serde_json::json!(5));
//! let value = state.get_or("counter", serde_json::json!(0));
//! state.delete("counter");
//! ```

mod error;
mod model;
mod persist;
mod store;

pub use error::{StateError, StateResult};
pub use model::StateModel;
pub use store::StateManager;

/// Default snapshot file name
pub const DEFAULT_STATE_FILE: &str = "state.json";

/// Current Unix timestamp in milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
