//! Strongly typed identifiers.
//!
//! # Purpose
//! Wraps the tenant identifier string to reduce accidental mix-ups with
//! client IDs, machine IDs, and user IDs, which are all plain strings on the
//! wire.
//!
//! # Key invariants
//! - `Display` and `as_str` return the original value.
//! - Emptiness is validated at the resolution boundary, not here.
use serde::{Deserialize, Serialize};

/// Tenant identifier wrapper.
///
/// # Example
/// ```rust
/// use shepherd_auth::TenantId;
///
/// let tenant = TenantId::new("tenant-a");
/// assert_eq!(tenant.as_str(), "tenant-a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
