//! Application context
//!
//! Owns the configuration and the shared state manager and hands out
//! services bound to them. Everything downstream borrows the same
//! `Arc<StateManager>`, so services see each other's writes.

use std::sync::Arc;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use statestore::{StateManager, StateModel, now_ms};
use tracing::{debug, info};

use crate::config::Config;
use crate::services::{MaterialService, MonitorService, P2pService};

/// Identity of the running application, stored under "app_info"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// When this instance started (Unix milliseconds)
    pub started_at: i64,
}

impl AppInfo {
    /// Snapshot of the current build and start time
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: now_ms(),
        }
    }
}

impl StateModel for AppInfo {
    fn collection_name() -> &'static str {
        "app_info"
    }
}

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    config: Config,
    state: Arc<StateManager>,
}

impl AppContext {
    /// Build the context from a configuration
    ///
    /// Opens the configured state file, or keeps state in memory when no
    /// path is configured, and records the running app under "app_info".
    pub fn new(config: Config) -> Result<Self> {
        debug!(state_path = ?config.state_path, "AppContext::new: called");
        let state = match &config.state_path {
            Some(path) => StateManager::open(path)
                .with_context(|| format!("Failed to open state file {}", path.display()))?,
            None => StateManager::in_memory(),
        };
        let state = Arc::new(state);

        let app_info = AppInfo::current();
        state
            .set_model(AppInfo::collection_name(), &app_info)
            .context("Failed to record app info")?;
        info!(name = %app_info.name, version = %app_info.version, "Application context ready");

        Ok(Self { config, state })
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared state manager
    pub fn state(&self) -> Arc<StateManager> {
        self.state.clone()
    }

    /// Identity recorded by the most recent startup
    pub fn app_info(&self) -> Option<AppInfo> {
        self.state.get_model(AppInfo::collection_name())
    }

    /// Material master service
    pub fn materials(&self) -> MaterialService {
        MaterialService::new(self.state.clone())
    }

    /// Procure-to-pay service
    pub fn p2p(&self) -> P2pService {
        P2pService::new(self.state.clone())
    }

    /// Monitoring service, sized from the configuration
    pub fn monitor(&self) -> MonitorService {
        MonitorService::with_capacity(self.state.clone(), self.config.metrics_capacity)
    }
}
