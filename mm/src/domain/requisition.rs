//! PurchaseRequisition domain type
//!
//! An internal request to procure a quantity of a material. Requisitions
//! start open, get approved or rejected, and approved ones convert into
//! purchase orders.

use serde::{Deserialize, Serialize};
use statestore::{StateModel, now_ms};
use tracing::debug;

use super::id::generate_id;

/// Requisition lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequisitionStatus {
    /// Awaiting approval
    #[default]
    Open,
    /// Approved for conversion to an order
    Approved,
    /// Rejected, will not be ordered
    Rejected,
    /// Converted into a purchase order
    Converted,
}

impl std::fmt::Display for RequisitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
            Self::Converted => write!(f, "converted"),
        }
    }
}

/// A purchase requisition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequisition {
    /// Unique identifier
    pub id: String,

    /// Material being requested
    pub material_id: String,

    /// Requested quantity in `unit`
    pub quantity: f64,

    /// Unit of measure for the quantity
    pub unit: String,

    /// Who raised the requisition
    pub requested_by: String,

    /// Free-form justification or note
    #[serde(default)]
    pub note: Option<String>,

    /// Current status
    pub status: RequisitionStatus,

    /// Purchase order created from this requisition (set on conversion)
    #[serde(default)]
    pub order_id: Option<String>,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl PurchaseRequisition {
    /// Create a new open requisition with a generated ID
    pub fn new(
        material_id: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        requested_by: impl Into<String>,
    ) -> Self {
        let material_id = material_id.into();
        debug!(%material_id, quantity, "PurchaseRequisition::new: called");
        let now = now_ms();

        Self {
            id: generate_id("req"),
            material_id,
            quantity,
            unit: unit.into(),
            requested_by: requested_by.into(),
            note: None,
            status: RequisitionStatus::Open,
            order_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create with a specific ID (for testing or import)
    pub fn with_id(
        id: impl Into<String>,
        material_id: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        requested_by: impl Into<String>,
    ) -> Self {
        let id = id.into();
        debug!(%id, "PurchaseRequisition::with_id: called");
        Self {
            id,
            ..Self::new(material_id, quantity, unit, requested_by)
        }
    }

    /// Builder method to attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        debug!(%self.id, "PurchaseRequisition::with_note");
        self
    }

    /// Transition from Open to Approved
    ///
    /// Returns true if the transition was made, false when not open.
    pub fn approve(&mut self) -> bool {
        debug!(%self.id, ?self.status, "PurchaseRequisition::approve: called");
        if self.status == RequisitionStatus::Open {
            debug!("PurchaseRequisition::approve: was open, transitioning to approved");
            self.status = RequisitionStatus::Approved;
            self.updated_at = now_ms();
            true
        } else {
            debug!("PurchaseRequisition::approve: not open, no transition");
            false
        }
    }

    /// Transition from Open to Rejected
    ///
    /// Returns true if the transition was made, false when not open.
    pub fn reject(&mut self) -> bool {
        debug!(%self.id, ?self.status, "PurchaseRequisition::reject: called");
        if self.status == RequisitionStatus::Open {
            debug!("PurchaseRequisition::reject: was open, transitioning to rejected");
            self.status = RequisitionStatus::Rejected;
            self.updated_at = now_ms();
            true
        } else {
            debug!("PurchaseRequisition::reject: not open, no transition");
            false
        }
    }

    /// Transition from Approved to Converted, recording the order created
    ///
    /// Returns true if the transition was made, false when not approved.
    pub fn mark_converted(&mut self, order_id: impl Into<String>) -> bool {
        let order_id = order_id.into();
        debug!(%self.id, %order_id, ?self.status, "PurchaseRequisition::mark_converted: called");
        if self.status == RequisitionStatus::Approved {
            debug!("PurchaseRequisition::mark_converted: was approved, transitioning to converted");
            self.status = RequisitionStatus::Converted;
            self.order_id = Some(order_id);
            self.updated_at = now_ms();
            true
        } else {
            debug!("PurchaseRequisition::mark_converted: not approved, no transition");
            false
        }
    }

    /// Check if the requisition is still awaiting approval
    pub fn is_open(&self) -> bool {
        matches!(self.status, RequisitionStatus::Open)
    }

    /// Check if the requisition is approved and ready to convert
    pub fn is_approved(&self) -> bool {
        matches!(self.status, RequisitionStatus::Approved)
    }

    /// Check if the requisition reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, RequisitionStatus::Rejected | RequisitionStatus::Converted)
    }
}

impl StateModel for PurchaseRequisition {
    fn collection_name() -> &'static str {
        "purchase_requisitions"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requisition_new() {
        let req = PurchaseRequisition::new("mat-123", 50.0, "EA", "jdoe");
        assert!(req.id.starts_with("req-"));
        assert_eq!(req.material_id, "mat-123");
        assert_eq!(req.quantity, 50.0);
        assert_eq!(req.status, RequisitionStatus::Open);
        assert!(req.order_id.is_none());
        assert!(req.is_open());
    }

    #[test]
    fn test_requisition_approve() {
        let mut req = PurchaseRequisition::new("mat-123", 50.0, "EA", "jdoe");

        assert!(req.approve());
        assert_eq!(req.status, RequisitionStatus::Approved);
        assert!(req.is_approved());

        // Approving again is a no-op
        assert!(!req.approve());
    }

    #[test]
    fn test_requisition_reject_only_when_open() {
        let mut req = PurchaseRequisition::new("mat-123", 50.0, "EA", "jdoe");
        req.approve();

        assert!(!req.reject());
        assert_eq!(req.status, RequisitionStatus::Approved);
    }

    #[test]
    fn test_requisition_convert_requires_approval() {
        let mut req = PurchaseRequisition::new("mat-123", 50.0, "EA", "jdoe");

        // Cannot convert an open requisition
        assert!(!req.mark_converted("ord-1"));
        assert!(req.order_id.is_none());

        req.approve();
        assert!(req.mark_converted("ord-1"));
        assert_eq!(req.status, RequisitionStatus::Converted);
        assert_eq!(req.order_id, Some("ord-1".to_string()));
        assert!(req.is_terminal());
    }

    #[test]
    fn test_requisition_terminal_states() {
        let mut rejected = PurchaseRequisition::new("mat-1", 1.0, "EA", "jdoe");
        rejected.reject();
        assert!(rejected.is_terminal());

        let open = PurchaseRequisition::new("mat-1", 1.0, "EA", "jdoe");
        assert!(!open.is_terminal());
    }

    #[test]
    fn test_requisition_status_serde() {
        let mut req = PurchaseRequisition::new("mat-123", 50.0, "EA", "jdoe");
        req.approve();

        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"status\":\"approved\""));

        let restored: PurchaseRequisition = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.status, RequisitionStatus::Approved);
    }

    #[test]
    fn test_requisition_status_display() {
        assert_eq!(RequisitionStatus::Open.to_string(), "open");
        assert_eq!(RequisitionStatus::Converted.to_string(), "converted");
    }
}
