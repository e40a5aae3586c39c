//! Snapshot persistence for the state file
//!
//! One JSON object per file: store keys map to stored values. Writes land in
//! a temp file first and rename over the target, so a reader never observes a
//! partial snapshot. A lock file sibling enforces single ownership.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{StateError, StateResult};
use crate::now_ms;

/// Owns the state file path and its lock for the life of a manager
pub(crate) struct Snapshot {
    path: PathBuf,
    /// Held open so the advisory lock lasts until drop
    _lock_file: fs::File,
}

impl Snapshot {
    /// Acquire the snapshot at `path`, creating parent directories as needed
    pub(crate) fn acquire(path: &Path) -> StateResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StateError::Persistence(e.to_string()))?;
        }

        let lock_path = sibling(path, "lock");
        let lock_file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StateError::Persistence(e.to_string()))?;
        lock_file
            .try_lock_exclusive()
            .map_err(|_| StateError::Locked(path.display().to_string()))?;

        debug!(path = %path.display(), "Acquired state file");
        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Load the snapshot, starting empty when the file is missing or unusable
    pub(crate) fn load(&self) -> HashMap<String, Value> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No state file yet, starting empty");
            return HashMap::new();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot read state file, starting empty");
                return HashMap::new();
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => {
                // Null entries mean "absent" and are dropped on load
                let entries: HashMap<String, Value> = map.into_iter().filter(|(_, v)| !v.is_null()).collect();
                info!(path = %self.path.display(), count = entries.len(), "Loaded state file");
                entries
            }
            Ok(_) => {
                self.back_up_corrupt("top level is not a JSON object");
                HashMap::new()
            }
            Err(e) => {
                self.back_up_corrupt(&e.to_string());
                HashMap::new()
            }
        }
    }

    /// Write the full snapshot atomically (temp file, then rename)
    pub(crate) fn save(&self, entries: &HashMap<String, Value>) -> StateResult<()> {
        let tmp_path = sibling(&self.path, "tmp");
        let json = serde_json::to_string_pretty(entries).map_err(|e| StateError::Serialization(e.to_string()))?;

        fs::write(&tmp_path, json).map_err(|e| StateError::Persistence(e.to_string()))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| StateError::Persistence(e.to_string()))?;

        debug!(path = %self.path.display(), count = entries.len(), "Saved state file");
        Ok(())
    }

    /// Move a corrupt state file aside so the next save starts clean
    fn back_up_corrupt(&self, reason: &str) {
        let backup = sibling(&self.path, &format!("corrupted.{}", now_ms()));
        match fs::rename(&self.path, &backup) {
            Ok(()) => {
                warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    %reason,
                    "State file corrupted, backed up and starting empty"
                );
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    %reason,
                    "State file corrupted and could not be backed up, starting empty"
                );
            }
        }
    }
}

/// Build a sibling path by appending an extra extension
fn sibling(path: &Path, ext: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}", path.display(), ext))
}
