//! Monitoring domain types
//!
//! Append-only metric samples, an error log, and per-component health
//! reports. All three are stored as capped collections by MonitorService.

use serde::{Deserialize, Serialize};
use statestore::{StateModel, now_ms};
use tracing::debug;

use super::id::generate_id;

/// Severity of a logged error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational, no action needed
    Info,
    /// Degraded behavior worth attention
    #[default]
    Warning,
    /// Failure of an operation
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Reported health of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    /// Operating normally
    #[default]
    Healthy,
    /// Working but impaired
    Degraded,
    /// Not working
    Down,
}

impl std::fmt::Display for Health {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// One sampled metric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetric {
    /// Metric name (e.g., "open_orders", "response_ms")
    pub name: String,

    /// Sampled value
    pub value: f64,

    /// Unit of the value (e.g., "count", "ms")
    pub unit: String,

    /// Sample timestamp (Unix milliseconds)
    pub recorded_at: i64,
}

impl SystemMetric {
    /// Record a metric sample at the current time
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        let name = name.into();
        debug!(%name, value, "SystemMetric::new: called");
        Self {
            name,
            value,
            unit: unit.into(),
            recorded_at: now_ms(),
        }
    }
}

impl StateModel for SystemMetric {
    fn collection_name() -> &'static str {
        "system_metrics"
    }
}

/// One entry in the error log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Unique identifier
    pub id: String,

    /// Component that reported the error
    pub component: String,

    /// Human-readable message
    pub message: String,

    /// Severity of the error
    pub severity: Severity,

    /// When the error occurred (Unix milliseconds)
    pub occurred_at: i64,
}

impl ErrorEntry {
    /// Log an error at the current time
    pub fn new(component: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        let component = component.into();
        debug!(%component, %severity, "ErrorEntry::new: called");
        Self {
            id: generate_id("err"),
            component,
            message: message.into(),
            severity,
            occurred_at: now_ms(),
        }
    }
}

impl StateModel for ErrorEntry {
    fn collection_name() -> &'static str {
        "error_logs"
    }
}

/// Latest health report for one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// Component name (unique within the collection)
    pub component: String,

    /// Reported health
    pub health: Health,

    /// Optional detail message
    #[serde(default)]
    pub message: Option<String>,

    /// When the component was last checked (Unix milliseconds)
    pub checked_at: i64,
}

impl ComponentStatus {
    /// Report a component's health at the current time
    pub fn new(component: impl Into<String>, health: Health) -> Self {
        let component = component.into();
        debug!(%component, %health, "ComponentStatus::new: called");
        Self {
            component,
            health,
            message: None,
            checked_at: now_ms(),
        }
    }

    /// Builder method to attach a detail message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Check if the component is operating normally
    pub fn is_healthy(&self) -> bool {
        matches!(self.health, Health::Healthy)
    }
}

impl StateModel for ComponentStatus {
    fn collection_name() -> &'static str {
        "component_status"
    }
}
