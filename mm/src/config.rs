//! Configuration for matman

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the JSON state file; None keeps all state in memory
    #[serde(default = "default_state_path")]
    pub state_path: Option<PathBuf>,

    /// Maximum retained metric and error log entries
    #[serde(default = "default_metrics_capacity")]
    pub metrics_capacity: usize,

    /// Currency assumed for new materials
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_state_path() -> Option<PathBuf> {
    Some(
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("matman")
            .join(statestore::DEFAULT_STATE_FILE),
    )
}

fn default_metrics_capacity() -> usize {
    crate::DEFAULT_METRICS_CAPACITY
}

fn default_currency() -> String {
    crate::DEFAULT_CURRENCY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            metrics_capacity: default_metrics_capacity(),
            default_currency: default_currency(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("matman").join("config.yml")),
            Some(PathBuf::from("matman.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Config with no state file, for tests and throwaway runs
    pub fn ephemeral() -> Self {
        Self {
            state_path: None,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert!(config.state_path.is_some());
        assert_eq!(config.metrics_capacity, crate::DEFAULT_METRICS_CAPACITY);
        assert_eq!(config.default_currency, crate::DEFAULT_CURRENCY);
    }

    #[test]
    fn test_config_ephemeral_has_no_state_path() {
        let config = Config::ephemeral();
        assert!(config.state_path.is_none());
        assert_eq!(config.default_currency, crate::DEFAULT_CURRENCY);
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");

        let mut config = Config::default();
        config.metrics_capacity = 25;
        config.default_currency = "EUR".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.metrics_capacity, 25);
        assert_eq!(loaded.default_currency, "EUR");
    }

    #[test]
    fn test_config_partial_yaml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "metrics_capacity: 10\n").unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.metrics_capacity, 10);
        assert_eq!(loaded.default_currency, crate::DEFAULT_CURRENCY);
        assert!(loaded.state_path.is_some());
    }
}
