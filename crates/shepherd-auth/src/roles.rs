//! Platform roles and effective-role expansion.
use serde::{Deserialize, Serialize};

/// Role granted to a principal (machine client or dashboard user).
///
/// Serialized in uppercase inside token claims, e.g. `"ADMIN"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Owner,
    Admin,
    Agent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Admin => "ADMIN",
            Role::Agent => "AGENT",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expand assigned roles into the effective set placed in token claims.
///
/// Owner implies Admin. The result preserves assignment order, deduplicates,
/// and never mutates the input; callers can re-invoke it with the same slice
/// and get the same answer.
pub fn effective_roles(assigned: &[Role]) -> Vec<Role> {
    let mut effective: Vec<Role> = Vec::with_capacity(assigned.len() + 1);
    for role in assigned {
        if !effective.contains(role) {
            effective.push(*role);
        }
    }
    if effective.contains(&Role::Owner) && !effective.contains(&Role::Admin) {
        effective.push(Role::Admin);
    }
    effective
}
