//! Domain ID generation

use uuid::Uuid;

/// Generate a prefixed, time-ordered ID (UUIDv7)
pub(crate) fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::now_v7())
}
