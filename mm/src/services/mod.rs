//! Services over the shared state store
//!
//! Each service owns a set of named collections in the state store and
//! exposes the operations the application performs on them.

mod error;
mod material;
mod monitor;
mod p2p;

// Re-export service types for convenience
pub use error::{ServiceError, ServiceResult};
pub use material::MaterialService;
pub use monitor::{HealthSummary, MonitorService};
pub use p2p::P2pService;
