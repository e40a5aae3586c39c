//! Procure-to-pay service
//!
//! Owns the "purchase_requisitions" and "purchase_orders" collections and
//! drives the requisition-to-order lifecycle: open requisitions get approved
//! or rejected, approved ones convert into orders, orders get placed,
//! delivered, or cancelled.

use std::sync::Arc;

use statestore::{StateManager, StateModel};
use tracing::debug;

use crate::domain::{Material, OrderStatus, PurchaseOrder, PurchaseRequisition, RequisitionStatus};

use super::error::{ServiceError, ServiceResult};

/// Service for purchase requisitions and purchase orders
#[derive(Clone)]
pub struct P2pService {
    state: Arc<StateManager>,
}

impl P2pService {
    /// Create a service bound to the shared state manager
    pub fn new(state: Arc<StateManager>) -> Self {
        Self { state }
    }

    // === Requisition operations ===

    /// Create a new purchase requisition
    pub fn create_requisition(&self, requisition: PurchaseRequisition) -> ServiceResult<String> {
        debug!(
            requisition_id = %requisition.id,
            material_id = %requisition.material_id,
            quantity = requisition.quantity,
            "P2pService::create_requisition: called"
        );
        // NaN and infinity have no JSON representation and would corrupt the record
        if !requisition.quantity.is_finite() || requisition.quantity <= 0.0 {
            return Err(ServiceError::Validation("Requisition quantity must be a positive number".to_string()));
        }
        if requisition.unit.trim().is_empty() {
            return Err(ServiceError::Validation("Requisition unit must not be empty".to_string()));
        }
        if requisition.requested_by.trim().is_empty() {
            return Err(ServiceError::Validation("Requisition requester must not be empty".to_string()));
        }
        self.material_required(&requisition.material_id)?;

        let mut requisitions = self.load_requisitions();
        if requisitions.iter().any(|r| r.id == requisition.id) {
            return Err(ServiceError::Conflict(format!(
                "Requisition {} already exists",
                requisition.id
            )));
        }

        let id = requisition.id.clone();
        requisitions.push(requisition);
        self.store_requisitions(&requisitions)?;
        Ok(id)
    }

    /// Get a requisition by ID
    pub fn get_requisition(&self, id: &str) -> Option<PurchaseRequisition> {
        debug!(%id, "P2pService::get_requisition: called");
        self.load_requisitions().into_iter().find(|r| r.id == id)
    }

    /// List requisitions, optionally filtered by status
    pub fn list_requisitions(&self, status_filter: Option<RequisitionStatus>) -> Vec<PurchaseRequisition> {
        debug!(?status_filter, "P2pService::list_requisitions: called");
        self.load_requisitions()
            .into_iter()
            .filter(|r| status_filter.is_none_or(|status| r.status == status))
            .collect()
    }

    /// Approve an open requisition
    pub fn approve_requisition(&self, id: &str) -> ServiceResult<()> {
        debug!(%id, "P2pService::approve_requisition: called");
        let mut requisitions = self.load_requisitions();
        let Some(requisition) = requisitions.iter_mut().find(|r| r.id == id) else {
            return Err(ServiceError::NotFound(format!("Requisition {}", id)));
        };

        if !requisition.approve() {
            debug!(%id, "P2pService::approve_requisition: not open, cannot approve");
            return Err(ServiceError::Conflict("Can only approve open requisitions".to_string()));
        }
        self.store_requisitions(&requisitions)
    }

    /// Reject an open requisition
    pub fn reject_requisition(&self, id: &str) -> ServiceResult<()> {
        debug!(%id, "P2pService::reject_requisition: called");
        let mut requisitions = self.load_requisitions();
        let Some(requisition) = requisitions.iter_mut().find(|r| r.id == id) else {
            return Err(ServiceError::NotFound(format!("Requisition {}", id)));
        };

        if !requisition.reject() {
            debug!(%id, "P2pService::reject_requisition: not open, cannot reject");
            return Err(ServiceError::Conflict("Can only reject open requisitions".to_string()));
        }
        self.store_requisitions(&requisitions)
    }

    /// Convert an approved requisition into a purchase order
    ///
    /// The order takes material, quantity, and unit from the requisition and
    /// currency from the material master. Returns the new order's ID.
    pub fn convert_to_order(
        &self,
        requisition_id: &str,
        vendor: impl Into<String>,
        unit_price: f64,
    ) -> ServiceResult<String> {
        let vendor = vendor.into();
        debug!(%requisition_id, %vendor, unit_price, "P2pService::convert_to_order: called");
        if vendor.trim().is_empty() {
            return Err(ServiceError::Validation("Vendor must not be empty".to_string()));
        }
        if !unit_price.is_finite() || unit_price < 0.0 {
            return Err(ServiceError::Validation("Unit price must be a non-negative number".to_string()));
        }

        let mut requisitions = self.load_requisitions();
        let Some(requisition) = requisitions.iter_mut().find(|r| r.id == requisition_id) else {
            return Err(ServiceError::NotFound(format!("Requisition {}", requisition_id)));
        };
        if !requisition.is_approved() {
            debug!(%requisition_id, status = %requisition.status, "P2pService::convert_to_order: not approved");
            return Err(ServiceError::Conflict(
                "Can only convert approved requisitions".to_string(),
            ));
        }

        let material = self.material_required(&requisition.material_id)?;
        let order = PurchaseOrder::from_requisition(requisition, &vendor, unit_price, material.currency);
        requisition.mark_converted(&order.id);

        let order_id = order.id.clone();
        let mut orders = self.load_orders();
        orders.push(order);
        self.store_orders(&orders)?;
        self.store_requisitions(&requisitions)?;

        debug!(%requisition_id, %order_id, "P2pService::convert_to_order: converted");
        Ok(order_id)
    }

    // === Order operations ===

    /// Get an order by ID
    pub fn get_order(&self, id: &str) -> Option<PurchaseOrder> {
        debug!(%id, "P2pService::get_order: called");
        self.load_orders().into_iter().find(|o| o.id == id)
    }

    /// List orders, optionally filtered by status
    pub fn list_orders(&self, status_filter: Option<OrderStatus>) -> Vec<PurchaseOrder> {
        debug!(?status_filter, "P2pService::list_orders: called");
        self.load_orders()
            .into_iter()
            .filter(|o| status_filter.is_none_or(|status| o.status == status))
            .collect()
    }

    /// Send an open order to its vendor
    pub fn place_order(&self, id: &str) -> ServiceResult<()> {
        debug!(%id, "P2pService::place_order: called");
        let mut orders = self.load_orders();
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return Err(ServiceError::NotFound(format!("Order {}", id)));
        };

        if !order.mark_ordered() {
            debug!(%id, "P2pService::place_order: not open, cannot place");
            return Err(ServiceError::Conflict("Can only place open orders".to_string()));
        }
        self.store_orders(&orders)
    }

    /// Record delivery of a placed order
    pub fn mark_order_delivered(&self, id: &str) -> ServiceResult<()> {
        debug!(%id, "P2pService::mark_order_delivered: called");
        let mut orders = self.load_orders();
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return Err(ServiceError::NotFound(format!("Order {}", id)));
        };

        if !order.mark_delivered() {
            debug!(%id, "P2pService::mark_order_delivered: not placed, cannot deliver");
            return Err(ServiceError::Conflict("Can only deliver placed orders".to_string()));
        }
        self.store_orders(&orders)
    }

    /// Cancel an order that has not reached a terminal state
    pub fn cancel_order(&self, id: &str) -> ServiceResult<()> {
        debug!(%id, "P2pService::cancel_order: called");
        let mut orders = self.load_orders();
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return Err(ServiceError::NotFound(format!("Order {}", id)));
        };

        if !order.cancel() {
            debug!(%id, "P2pService::cancel_order: order is terminal, cannot cancel");
            return Err(ServiceError::Conflict("Cannot cancel a terminal order".to_string()));
        }
        self.store_orders(&orders)
    }

    fn material_required(&self, material_id: &str) -> ServiceResult<Material> {
        let materials: Vec<Material> = self.state.get_collection(Material::collection_name());
        materials
            .into_iter()
            .find(|m| m.id == material_id)
            .ok_or_else(|| ServiceError::NotFound(format!("Material {}", material_id)))
    }

    fn load_requisitions(&self) -> Vec<PurchaseRequisition> {
        self.state.get_collection(PurchaseRequisition::collection_name())
    }

    fn store_requisitions(&self, requisitions: &[PurchaseRequisition]) -> ServiceResult<()> {
        self.state
            .set_collection(PurchaseRequisition::collection_name(), requisitions)?;
        Ok(())
    }

    fn load_orders(&self) -> Vec<PurchaseOrder> {
        self.state.get_collection(PurchaseOrder::collection_name())
    }

    fn store_orders(&self, orders: &[PurchaseOrder]) -> ServiceResult<()> {
        self.state.set_collection(PurchaseOrder::collection_name(), orders)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MaterialService;

    fn setup() -> (P2pService, String) {
        let state = Arc::new(StateManager::in_memory());
        let materials = MaterialService::new(state.clone());
        let material_id = materials
            .create(Material::new("Hex bolt M8", "EA").with_price(0.1, "EUR"))
            .unwrap();
        (P2pService::new(state), material_id)
    }

    #[test]
    fn test_create_requisition() {
        let (p2p, material_id) = setup();
        let id = p2p
            .create_requisition(PurchaseRequisition::new(&material_id, 500.0, "EA", "jdoe"))
            .unwrap();

        let req = p2p.get_requisition(&id).unwrap();
        assert_eq!(req.material_id, material_id);
        assert!(req.is_open());
    }

    #[test]
    fn test_create_requisition_unknown_material() {
        let (p2p, _) = setup();
        let result = p2p.create_requisition(PurchaseRequisition::new("mat-ghost", 500.0, "EA", "jdoe"));
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_create_requisition_rejects_bad_quantity() {
        let (p2p, material_id) = setup();
        let result = p2p.create_requisition(PurchaseRequisition::new(&material_id, 0.0, "EA", "jdoe"));
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_create_requisition_rejects_non_finite_quantity() {
        let (p2p, material_id) = setup();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result =
                p2p.create_requisition(PurchaseRequisition::new(&material_id, bad, "EA", "jdoe"));
            assert!(matches!(result, Err(ServiceError::Validation(_))));
        }

        // Rejected up front: nothing was stored, so nothing can vanish later
        assert!(p2p.list_requisitions(None).is_empty());
    }

    #[test]
    fn test_convert_rejects_non_finite_unit_price() {
        let (p2p, material_id) = setup();
        let req_id = p2p
            .create_requisition(PurchaseRequisition::new(&material_id, 10.0, "EA", "jdoe"))
            .unwrap();
        p2p.approve_requisition(&req_id).unwrap();

        let result = p2p.convert_to_order(&req_id, "ACME Corp", f64::NAN);
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        // The requisition is untouched and still converts at a real price
        assert!(p2p.get_requisition(&req_id).unwrap().is_approved());
        assert!(p2p.list_orders(None).is_empty());
        assert!(p2p.convert_to_order(&req_id, "ACME Corp", 0.09).is_ok());
    }

    #[test]
    fn test_approve_and_reject() {
        let (p2p, material_id) = setup();
        let a = p2p
            .create_requisition(PurchaseRequisition::new(&material_id, 10.0, "EA", "jdoe"))
            .unwrap();
        let b = p2p
            .create_requisition(PurchaseRequisition::new(&material_id, 20.0, "EA", "jdoe"))
            .unwrap();

        p2p.approve_requisition(&a).unwrap();
        p2p.reject_requisition(&b).unwrap();

        assert!(p2p.get_requisition(&a).unwrap().is_approved());
        assert_eq!(p2p.get_requisition(&b).unwrap().status, RequisitionStatus::Rejected);

        // Double approval is a conflict
        assert!(matches!(p2p.approve_requisition(&a), Err(ServiceError::Conflict(_))));
        // Rejecting an approved requisition is a conflict
        assert!(matches!(p2p.reject_requisition(&a), Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn test_approve_missing_requisition() {
        let (p2p, _) = setup();
        assert!(matches!(
            p2p.approve_requisition("req-ghost"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_requisitions_with_filter() {
        let (p2p, material_id) = setup();
        let a = p2p
            .create_requisition(PurchaseRequisition::new(&material_id, 10.0, "EA", "jdoe"))
            .unwrap();
        p2p.create_requisition(PurchaseRequisition::new(&material_id, 20.0, "EA", "jdoe"))
            .unwrap();
        p2p.approve_requisition(&a).unwrap();

        assert_eq!(p2p.list_requisitions(None).len(), 2);
        let approved = p2p.list_requisitions(Some(RequisitionStatus::Approved));
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, a);
    }

    #[test]
    fn test_convert_to_order() {
        let (p2p, material_id) = setup();
        let req_id = p2p
            .create_requisition(PurchaseRequisition::new(&material_id, 500.0, "EA", "jdoe"))
            .unwrap();
        p2p.approve_requisition(&req_id).unwrap();

        let order_id = p2p.convert_to_order(&req_id, "ACME Corp", 0.09).unwrap();

        let order = p2p.get_order(&order_id).unwrap();
        assert_eq!(order.requisition_id, Some(req_id.clone()));
        assert_eq!(order.material_id, material_id);
        assert_eq!(order.quantity, 500.0);
        assert_eq!(order.unit_price, 0.09);
        // Currency comes from the material master
        assert_eq!(order.currency, "EUR");
        assert!(order.is_open());

        let req = p2p.get_requisition(&req_id).unwrap();
        assert_eq!(req.status, RequisitionStatus::Converted);
        assert_eq!(req.order_id, Some(order_id));
    }

    #[test]
    fn test_convert_requires_approval() {
        let (p2p, material_id) = setup();
        let req_id = p2p
            .create_requisition(PurchaseRequisition::new(&material_id, 500.0, "EA", "jdoe"))
            .unwrap();

        let result = p2p.convert_to_order(&req_id, "ACME Corp", 0.09);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));

        // A converted requisition cannot convert again
        p2p.approve_requisition(&req_id).unwrap();
        p2p.convert_to_order(&req_id, "ACME Corp", 0.09).unwrap();
        let result = p2p.convert_to_order(&req_id, "ACME Corp", 0.09);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn test_convert_missing_requisition() {
        let (p2p, _) = setup();
        assert!(matches!(
            p2p.convert_to_order("req-ghost", "ACME Corp", 1.0),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_order_lifecycle() {
        let (p2p, material_id) = setup();
        let req_id = p2p
            .create_requisition(PurchaseRequisition::new(&material_id, 500.0, "EA", "jdoe"))
            .unwrap();
        p2p.approve_requisition(&req_id).unwrap();
        let order_id = p2p.convert_to_order(&req_id, "ACME Corp", 0.09).unwrap();

        p2p.place_order(&order_id).unwrap();
        assert_eq!(p2p.get_order(&order_id).unwrap().status, OrderStatus::Ordered);

        p2p.mark_order_delivered(&order_id).unwrap();
        assert_eq!(p2p.get_order(&order_id).unwrap().status, OrderStatus::Delivered);

        // Delivered orders refuse further transitions
        assert!(matches!(p2p.cancel_order(&order_id), Err(ServiceError::Conflict(_))));
        assert!(matches!(p2p.place_order(&order_id), Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn test_deliver_requires_placed_order() {
        let (p2p, material_id) = setup();
        let req_id = p2p
            .create_requisition(PurchaseRequisition::new(&material_id, 500.0, "EA", "jdoe"))
            .unwrap();
        p2p.approve_requisition(&req_id).unwrap();
        let order_id = p2p.convert_to_order(&req_id, "ACME Corp", 0.09).unwrap();

        assert!(matches!(
            p2p.mark_order_delivered(&order_id),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn test_cancel_open_order() {
        let (p2p, material_id) = setup();
        let req_id = p2p
            .create_requisition(PurchaseRequisition::new(&material_id, 500.0, "EA", "jdoe"))
            .unwrap();
        p2p.approve_requisition(&req_id).unwrap();
        let order_id = p2p.convert_to_order(&req_id, "ACME Corp", 0.09).unwrap();

        p2p.cancel_order(&order_id).unwrap();
        assert_eq!(p2p.get_order(&order_id).unwrap().status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_list_orders_with_filter() {
        let (p2p, material_id) = setup();
        for _ in 0..2 {
            let req_id = p2p
                .create_requisition(PurchaseRequisition::new(&material_id, 10.0, "EA", "jdoe"))
                .unwrap();
            p2p.approve_requisition(&req_id).unwrap();
            p2p.convert_to_order(&req_id, "ACME Corp", 1.0).unwrap();
        }
        let order_id = p2p.list_orders(None)[0].id.clone();
        p2p.place_order(&order_id).unwrap();

        assert_eq!(p2p.list_orders(None).len(), 2);
        assert_eq!(p2p.list_orders(Some(OrderStatus::Open)).len(), 1);
        assert_eq!(p2p.list_orders(Some(OrderStatus::Ordered)).len(), 1);
    }
}
