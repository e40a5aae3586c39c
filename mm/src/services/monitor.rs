//! System monitoring service
//!
//! Owns the "system_metrics", "error_logs", and "component_status"
//! collections. Metric and error histories are capped so the state file
//! cannot grow without bound; component statuses are upserted per component.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use statestore::{StateManager, StateModel};
use tracing::debug;

use crate::domain::{ComponentStatus, ErrorEntry, Health, SystemMetric};

use super::error::{ServiceError, ServiceResult};

/// Aggregated component health counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    /// Components reporting healthy
    pub healthy: usize,
    /// Components reporting degraded
    pub degraded: usize,
    /// Components reporting down
    pub down: usize,
    /// Total components with a recorded status
    pub total: usize,
}

impl HealthSummary {
    /// Overall health, taken as the worst reported state
    pub fn overall(&self) -> Health {
        if self.down > 0 {
            Health::Down
        } else if self.degraded > 0 {
            Health::Degraded
        } else {
            Health::Healthy
        }
    }
}

/// Service for metrics, error logs, and component health
#[derive(Clone)]
pub struct MonitorService {
    state: Arc<StateManager>,
    capacity: usize,
}

impl MonitorService {
    /// Create a service with the default history capacity
    pub fn new(state: Arc<StateManager>) -> Self {
        Self::with_capacity(state, crate::DEFAULT_METRICS_CAPACITY)
    }

    /// Create a service that keeps at most `capacity` metrics and errors
    pub fn with_capacity(state: Arc<StateManager>, capacity: usize) -> Self {
        debug!(capacity, "MonitorService::with_capacity: called");
        Self { state, capacity }
    }

    // === Metrics ===

    /// Append a metric sample, dropping the oldest beyond capacity
    pub fn record_metric(&self, metric: SystemMetric) -> ServiceResult<()> {
        debug!(name = %metric.name, value = metric.value, "MonitorService::record_metric: called");
        // NaN and infinity have no JSON representation and would corrupt the sample
        if !metric.value.is_finite() {
            return Err(ServiceError::Validation("Metric value must be a finite number".to_string()));
        }
        let mut metrics: Vec<SystemMetric> = self.state.get_collection(SystemMetric::collection_name());
        metrics.push(metric);
        trim_oldest(&mut metrics, self.capacity);
        self.state.set_collection(SystemMetric::collection_name(), &metrics)?;
        Ok(())
    }

    /// Most recent metrics, newest first, optionally filtered by name
    pub fn recent_metrics(&self, name_filter: Option<&str>, limit: usize) -> Vec<SystemMetric> {
        debug!(?name_filter, limit, "MonitorService::recent_metrics: called");
        let metrics: Vec<SystemMetric> = self.state.get_collection(SystemMetric::collection_name());
        let mut matching: Vec<SystemMetric> = metrics
            .into_iter()
            .filter(|m| name_filter.is_none_or(|name| m.name == name))
            .collect();
        matching.reverse();
        matching.truncate(limit);
        matching
    }

    // === Error log ===

    /// Append an error entry, dropping the oldest beyond capacity
    ///
    /// Returns the entry's ID.
    pub fn log_error(&self, entry: ErrorEntry) -> ServiceResult<String> {
        debug!(component = %entry.component, severity = %entry.severity, "MonitorService::log_error: called");
        let id = entry.id.clone();
        let mut errors: Vec<ErrorEntry> = self.state.get_collection(ErrorEntry::collection_name());
        errors.push(entry);
        trim_oldest(&mut errors, self.capacity);
        self.state.set_collection(ErrorEntry::collection_name(), &errors)?;
        Ok(id)
    }

    /// Most recent error entries, newest first
    pub fn recent_errors(&self, limit: usize) -> Vec<ErrorEntry> {
        debug!(limit, "MonitorService::recent_errors: called");
        let mut errors: Vec<ErrorEntry> = self.state.get_collection(ErrorEntry::collection_name());
        errors.reverse();
        errors.truncate(limit);
        errors
    }

    // === Component health ===

    /// Record a component's health, replacing any previous status for it
    pub fn set_component_status(&self, status: ComponentStatus) -> ServiceResult<()> {
        debug!(component = %status.component, health = %status.health, "MonitorService::set_component_status: called");
        let mut statuses: Vec<ComponentStatus> =
            self.state.get_collection(ComponentStatus::collection_name());

        if let Some(existing) = statuses.iter_mut().find(|s| s.component == status.component) {
            *existing = status;
        } else {
            statuses.push(status);
        }
        self.state.set_collection(ComponentStatus::collection_name(), &statuses)?;
        Ok(())
    }

    /// All recorded component statuses
    pub fn component_statuses(&self) -> Vec<ComponentStatus> {
        debug!("MonitorService::component_statuses: called");
        self.state.get_collection(ComponentStatus::collection_name())
    }

    /// Count components by health state
    pub fn health_summary(&self) -> HealthSummary {
        debug!("MonitorService::health_summary: called");
        let mut summary = HealthSummary::default();
        for status in self.component_statuses() {
            match status.health {
                Health::Healthy => summary.healthy += 1,
                Health::Degraded => summary.degraded += 1,
                Health::Down => summary.down += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

/// Drop entries from the front until at most `capacity` remain
fn trim_oldest<T>(entries: &mut Vec<T>, capacity: usize) {
    if entries.len() > capacity {
        let excess = entries.len() - capacity;
        entries.drain(..excess);
    }
}
