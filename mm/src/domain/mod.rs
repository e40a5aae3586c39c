//! Domain types for matman
//!
//! Core domain types: Material, PurchaseRequisition, PurchaseOrder, plus the
//! monitoring records (SystemMetric, ErrorEntry, ComponentStatus).
//! All implement the StateModel trait for statestore persistence.

#[allow(unused_imports)]
use tracing::debug;

mod id;
mod material;
mod monitor;
mod order;
mod requisition;

pub use material::{Material, MaterialType};
pub use monitor::{ComponentStatus, ErrorEntry, Health, Severity, SystemMetric};
pub use order::{OrderStatus, PurchaseOrder};
pub use requisition::{PurchaseRequisition, RequisitionStatus};

// Re-export statestore types for convenience
pub use statestore::{StateManager, StateModel, now_ms};
