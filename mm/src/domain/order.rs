//! PurchaseOrder domain type
//!
//! A commitment to buy from a vendor, usually created by converting an
//! approved requisition.

use serde::{Deserialize, Serialize};
use statestore::{StateModel, now_ms};
use tracing::debug;

use super::id::generate_id;
use super::requisition::PurchaseRequisition;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, not yet sent to the vendor
    #[default]
    Open,
    /// Sent to the vendor
    Ordered,
    /// Goods received
    Delivered,
    /// Cancelled before delivery
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Ordered => write!(f, "ordered"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A purchase order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// Unique identifier
    pub id: String,

    /// Requisition this order was converted from (None for direct orders)
    #[serde(default)]
    pub requisition_id: Option<String>,

    /// Material being ordered
    pub material_id: String,

    /// Vendor the order goes to
    pub vendor: String,

    /// Ordered quantity in `unit`
    pub quantity: f64,

    /// Unit of measure for the quantity
    pub unit: String,

    /// Agreed price per unit
    pub unit_price: f64,

    /// Currency code for the unit price
    pub currency: String,

    /// Current status
    pub status: OrderStatus,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl PurchaseOrder {
    /// Create a new open order with a generated ID
    pub fn new(
        material_id: impl Into<String>,
        vendor: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        unit_price: f64,
        currency: impl Into<String>,
    ) -> Self {
        let material_id = material_id.into();
        let vendor = vendor.into();
        debug!(%material_id, %vendor, quantity, unit_price, "PurchaseOrder::new: called");
        let now = now_ms();

        Self {
            id: generate_id("ord"),
            requisition_id: None,
            material_id,
            vendor,
            quantity,
            unit: unit.into(),
            unit_price,
            currency: currency.into(),
            status: OrderStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an order from an approved requisition
    pub fn from_requisition(
        requisition: &PurchaseRequisition,
        vendor: impl Into<String>,
        unit_price: f64,
        currency: impl Into<String>,
    ) -> Self {
        debug!(requisition_id = %requisition.id, "PurchaseOrder::from_requisition: called");
        let mut order = Self::new(
            requisition.material_id.clone(),
            vendor,
            requisition.quantity,
            requisition.unit.clone(),
            unit_price,
            currency,
        );
        order.requisition_id = Some(requisition.id.clone());
        order
    }

    /// Total order value (quantity times unit price)
    pub fn total_value(&self) -> f64 {
        self.quantity * self.unit_price
    }

    /// Transition from Open to Ordered
    ///
    /// Returns true if the transition was made, false otherwise.
    pub fn mark_ordered(&mut self) -> bool {
        debug!(%self.id, ?self.status, "PurchaseOrder::mark_ordered: called");
        if self.status == OrderStatus::Open {
            debug!("PurchaseOrder::mark_ordered: was open, transitioning to ordered");
            self.status = OrderStatus::Ordered;
            self.updated_at = now_ms();
            true
        } else {
            debug!("PurchaseOrder::mark_ordered: not open, no transition");
            false
        }
    }

    /// Transition from Ordered to Delivered
    ///
    /// Returns true if the transition was made, false otherwise.
    pub fn mark_delivered(&mut self) -> bool {
        debug!(%self.id, ?self.status, "PurchaseOrder::mark_delivered: called");
        if self.status == OrderStatus::Ordered {
            debug!("PurchaseOrder::mark_delivered: was ordered, transitioning to delivered");
            self.status = OrderStatus::Delivered;
            self.updated_at = now_ms();
            true
        } else {
            debug!("PurchaseOrder::mark_delivered: not ordered, no transition");
            false
        }
    }

    /// Cancel the order unless it already reached a terminal state
    ///
    /// Returns true if the transition was made, false otherwise.
    pub fn cancel(&mut self) -> bool {
        debug!(%self.id, ?self.status, "PurchaseOrder::cancel: called");
        if self.is_terminal() {
            debug!("PurchaseOrder::cancel: already terminal, no transition");
            false
        } else {
            debug!("PurchaseOrder::cancel: transitioning to cancelled");
            self.status = OrderStatus::Cancelled;
            self.updated_at = now_ms();
            true
        }
    }

    /// Check if the order has not yet been sent to the vendor
    pub fn is_open(&self) -> bool {
        matches!(self.status, OrderStatus::Open)
    }

    /// Check if the order reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl StateModel for PurchaseOrder {
    fn collection_name() -> &'static str {
        "purchase_orders"
    }
}
