//! MatMan - material management and procurement over a persistent state store
//!
//! Implements a small procure-to-pay flow: a material master, purchase
//! requisitions that convert into purchase orders, and a monitoring layer
//! for metrics, error logs, and component health. All data lives in named
//! collections inside a single [`statestore::StateManager`].
//!
//! # Architecture
//!
//! ```text
//! AppContext
//! ├── MaterialService ──> "materials"
//! ├── P2pService ───────> "purchase_requisitions", "purchase_orders"
//! └── MonitorService ───> "system_metrics", "error_logs", "component_status"
//!                         (plus "app_info", written at startup)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use matman::{AppContext, Config};
//! use matman::domain::{Material, PurchaseRequisition};
//!
//! let ctx = AppContext::new(Config::load(None)?)?;
//!
//! let material_id = ctx.materials().create(Material::new("Hex bolt M8", "EA"))?;
//! let req_id = ctx
//!     .p2p()
//!     .create_requisition(PurchaseRequisition::new(&material_id, 500.0, "EA", "jdoe"))?;
//! ctx.p2p().approve_requisition(&req_id)?;
//! let order_id = ctx.p2p().convert_to_order(&req_id, "ACME Corp", 0.09)?;
//! ```

pub mod config;
pub mod context;
pub mod domain;
pub mod services;

pub use config::Config;
pub use context::{AppContext, AppInfo};

/// Currency assumed when a material does not specify one
pub const DEFAULT_CURRENCY: &str = "USD";

/// Default cap on retained metric and error log entries
pub const DEFAULT_METRICS_CAPACITY: usize = 1000;
