//! Material domain type
//!
//! A purchasable or producible item in the material master.

use serde::{Deserialize, Serialize};
use statestore::{StateModel, now_ms};
use tracing::debug;

use super::id::generate_id;

/// Kind of material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    /// Bought-in raw stock
    #[default]
    Raw,
    /// Produced intermediate
    SemiFinished,
    /// Sellable end product
    Finished,
    /// Non-stock service item
    Service,
}

impl std::fmt::Display for MaterialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::SemiFinished => write!(f, "semi_finished"),
            Self::Finished => write!(f, "finished"),
            Self::Service => write!(f, "service"),
        }
    }
}

/// A material master record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Kind of material
    pub material_type: MaterialType,

    /// Unit of measure for stock keeping (e.g., "EA", "KG")
    pub base_unit: String,

    /// Standard price per base unit
    pub standard_price: f64,

    /// Currency code for the standard price
    pub currency: String,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Material {
    /// Create a new material with a generated ID
    pub fn new(name: impl Into<String>, base_unit: impl Into<String>) -> Self {
        let name = name.into();
        let base_unit = base_unit.into();
        debug!(%name, %base_unit, "Material::new: called");
        let now = now_ms();

        Self {
            id: generate_id("mat"),
            name,
            description: String::new(),
            material_type: MaterialType::Raw,
            base_unit,
            standard_price: 0.0,
            currency: crate::DEFAULT_CURRENCY.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create with a specific ID (for testing or import)
    pub fn with_id(id: impl Into<String>, name: impl Into<String>, base_unit: impl Into<String>) -> Self {
        let id = id.into();
        debug!(%id, "Material::with_id: called");
        Self {
            id,
            ..Self::new(name, base_unit)
        }
    }

    /// Builder method to set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        debug!(%self.id, "Material::with_description");
        self
    }

    /// Builder method to set the material type
    pub fn with_material_type(mut self, material_type: MaterialType) -> Self {
        debug!(%self.id, %material_type, "Material::with_material_type");
        self.material_type = material_type;
        self
    }

    /// Builder method to set the standard price and currency
    pub fn with_price(mut self, standard_price: f64, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        debug!(%self.id, standard_price, %self.currency, "Material::with_price");
        self.standard_price = standard_price;
        self
    }

    /// Rename the material
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        debug!(%self.id, %name, "Material::set_name: called");
        self.name = name;
        self.updated_at = now_ms();
    }

    /// Update the description
    pub fn set_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        debug!(%self.id, "Material::set_description: called");
        self.description = description;
        self.updated_at = now_ms();
    }

    /// Update the standard price
    pub fn set_price(&mut self, standard_price: f64) {
        debug!(%self.id, standard_price, "Material::set_price: called");
        self.standard_price = standard_price;
        self.updated_at = now_ms();
    }

    /// Whether this is a non-stock service item
    pub fn is_service(&self) -> bool {
        matches!(self.material_type, MaterialType::Service)
    }
}

impl StateModel for Material {
    fn collection_name() -> &'static str {
        "materials"
    }
}
