//! Material master service
//!
//! CRUD over the "materials" collection. Deletion is guarded: a material
//! referenced by a live requisition or order cannot be removed.

use std::sync::Arc;

use statestore::{StateManager, StateModel};
use tracing::debug;

use crate::domain::{Material, MaterialType, PurchaseOrder, PurchaseRequisition};

use super::error::{ServiceError, ServiceResult};

/// CRUD service for the material master
#[derive(Clone)]
pub struct MaterialService {
    state: Arc<StateManager>,
}

impl MaterialService {
    /// Create a service bound to the shared state manager
    pub fn new(state: Arc<StateManager>) -> Self {
        Self { state }
    }

    /// Create a new material record
    pub fn create(&self, material: Material) -> ServiceResult<String> {
        debug!(material_id = %material.id, name = %material.name, "MaterialService::create: called");
        validate(&material)?;

        let mut materials = self.load();
        if materials.iter().any(|m| m.id == material.id) {
            return Err(ServiceError::Conflict(format!("Material {} already exists", material.id)));
        }

        let id = material.id.clone();
        materials.push(material);
        self.store(&materials)?;
        Ok(id)
    }

    /// Get a material by ID
    pub fn get(&self, id: &str) -> Option<Material> {
        debug!(%id, "MaterialService::get: called");
        self.load().into_iter().find(|m| m.id == id)
    }

    /// Get a material by ID, returning an error if not found
    pub fn get_required(&self, id: &str) -> ServiceResult<Material> {
        debug!(%id, "MaterialService::get_required: called");
        self.get(id).ok_or_else(|| ServiceError::NotFound(format!("Material {}", id)))
    }

    /// List all materials
    pub fn list(&self) -> Vec<Material> {
        debug!("MaterialService::list: called");
        self.load()
    }

    /// List materials of a given type
    pub fn list_by_type(&self, material_type: MaterialType) -> Vec<Material> {
        debug!(%material_type, "MaterialService::list_by_type: called");
        self.load().into_iter().filter(|m| m.material_type == material_type).collect()
    }

    /// Replace an existing material record
    pub fn update(&self, material: Material) -> ServiceResult<()> {
        debug!(material_id = %material.id, "MaterialService::update: called");
        validate(&material)?;

        let mut materials = self.load();
        let Some(slot) = materials.iter_mut().find(|m| m.id == material.id) else {
            return Err(ServiceError::NotFound(format!("Material {}", material.id)));
        };
        *slot = material;
        self.store(&materials)
    }

    /// Delete a material unless procurement documents still reference it
    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        debug!(%id, "MaterialService::delete: called");
        let mut materials = self.load();
        if !materials.iter().any(|m| m.id == id) {
            return Err(ServiceError::NotFound(format!("Material {}", id)));
        }

        let requisitions: Vec<PurchaseRequisition> =
            self.state.get_collection(PurchaseRequisition::collection_name());
        if requisitions.iter().any(|r| r.material_id == id && !r.is_terminal()) {
            debug!(%id, "MaterialService::delete: blocked by live requisition");
            return Err(ServiceError::Conflict(format!("Material {} has live purchase requisitions", id)));
        }

        let orders: Vec<PurchaseOrder> = self.state.get_collection(PurchaseOrder::collection_name());
        if orders.iter().any(|o| o.material_id == id && !o.is_terminal()) {
            debug!(%id, "MaterialService::delete: blocked by live order");
            return Err(ServiceError::Conflict(format!("Material {} has live purchase orders", id)));
        }

        materials.retain(|m| m.id != id);
        self.store(&materials)
    }

    /// Check whether a material exists
    pub fn exists(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn load(&self) -> Vec<Material> {
        self.state.get_collection(Material::collection_name())
    }

    fn store(&self, materials: &[Material]) -> ServiceResult<()> {
        self.state.set_collection(Material::collection_name(), materials)?;
        Ok(())
    }
}

fn validate(material: &Material) -> ServiceResult<()> {
    if material.name.trim().is_empty() {
        return Err(ServiceError::Validation("Material name must not be empty".to_string()));
    }
    if material.base_unit.trim().is_empty() {
        return Err(ServiceError::Validation("Material base unit must not be empty".to_string()));
    }
    // NaN and infinity have no JSON representation and would corrupt the record
    if !material.standard_price.is_finite() || material.standard_price < 0.0 {
        return Err(ServiceError::Validation("Standard price must be a non-negative number".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> MaterialService {
        MaterialService::new(Arc::new(StateManager::in_memory()))
    }

    #[test]
    fn test_create_and_get() {
        let materials = service();
        let id = materials.create(Material::new("Hex bolt M8", "EA")).unwrap();

        let found = materials.get(&id).unwrap();
        assert_eq!(found.name, "Hex bolt M8");
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let materials = service();
        let result = materials.create(Material::new("   ", "EA"));
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_create_rejects_negative_price() {
        let materials = service();
        let result = materials.create(Material::new("Hex bolt M8", "EA").with_price(-1.0, "USD"));
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_create_rejects_non_finite_price() {
        let materials = service();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = materials.create(Material::new("Hex bolt M8", "EA").with_price(bad, "USD"));
            assert!(matches!(result, Err(ServiceError::Validation(_))));
        }
        // Nothing slipped into the collection
        assert!(materials.list().is_empty());
    }

    #[test]
    fn test_create_rejects_duplicate_id() {
        let materials = service();
        let material = Material::with_id("mat-dup", "Hex bolt M8", "EA");
        materials.create(material.clone()).unwrap();

        let result = materials.create(material);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn test_get_missing_returns_none() {
        let materials = service();
        assert!(materials.get("mat-unknown").is_none());
        assert!(matches!(
            materials.get_required("mat-unknown"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_by_type() {
        let materials = service();
        materials.create(Material::new("Hex bolt M8", "EA")).unwrap();
        materials
            .create(Material::new("Inspection hour", "H").with_material_type(MaterialType::Service))
            .unwrap();

        assert_eq!(materials.list().len(), 2);
        let services = materials.list_by_type(MaterialType::Service);
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name, "Inspection hour");
    }

    #[test]
    fn test_update_replaces_record() {
        let materials = service();
        let id = materials.create(Material::new("Hex bolt M8", "EA")).unwrap();

        let mut updated = materials.get(&id).unwrap();
        updated.set_price(0.12);
        materials.update(updated).unwrap();

        assert_eq!(materials.get(&id).unwrap().standard_price, 0.12);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let materials = service();
        let result = materials.update(Material::new("Ghost", "EA"));
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_delete() {
        let materials = service();
        let id = materials.create(Material::new("Hex bolt M8", "EA")).unwrap();

        materials.delete(&id).unwrap();
        assert!(materials.get(&id).is_none());
        assert!(matches!(materials.delete(&id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_delete_blocked_by_live_requisition() {
        let state = Arc::new(StateManager::in_memory());
        let materials = MaterialService::new(state.clone());
        let id = materials.create(Material::new("Hex bolt M8", "EA")).unwrap();

        let req = PurchaseRequisition::new(&id, 10.0, "EA", "jdoe");
        state
            .set_collection(PurchaseRequisition::collection_name(), &[req])
            .unwrap();

        assert!(matches!(materials.delete(&id), Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn test_delete_allowed_after_requisition_terminal() {
        let state = Arc::new(StateManager::in_memory());
        let materials = MaterialService::new(state.clone());
        let id = materials.create(Material::new("Hex bolt M8", "EA")).unwrap();

        let mut req = PurchaseRequisition::new(&id, 10.0, "EA", "jdoe");
        req.reject();
        state
            .set_collection(PurchaseRequisition::collection_name(), &[req])
            .unwrap();

        assert!(materials.delete(&id).is_ok());
    }
}
