//! Path classification and role requirements.
//!
//! # Purpose
//! Single source of truth for which paths are public, which roles the
//! protected prefixes require, and which WebSocket endpoints carry the
//! session expiry guard.
//!
//! # Key invariants
//! - Classification is by longest-specific rule first: agent-scoped prefixes
//!   are checked before the broader admin prefixes that contain them.
//! - Anything not explicitly public requires a verified token, even when no
//!   specific role applies.
use shepherd_auth::Role;

pub const DASHBOARD_PREFIX: &str = "/api";
pub const TOOLS_PREFIX: &str = "/tools";
pub const TOOLS_AGENT_PREFIX: &str = "/tools/agent";
pub const WS_TOOLS_PREFIX: &str = "/ws/tools";
pub const WS_TOOLS_AGENT_PREFIX: &str = "/ws/tools/agent";
pub const CLIENTS_PREFIX: &str = "/clients";
pub const EVENTS_WS_PATH: &str = "/ws/events";

/// Prefixes exempt from authentication: probes, the token endpoint itself,
/// agent registration, and agent-pushed metrics.
const PUBLIC_PREFIXES: &[&str] = &[
    "/health",
    "/clients/oauth/token",
    "/clients/api/agents/register",
    "/clients/metrics/",
    "/error/",
];

pub fn is_public(path: &str) -> bool {
    PUBLIC_PREFIXES
        .iter()
        .any(|prefix| path == prefix.trim_end_matches('/') || path.starts_with(prefix))
}

pub fn is_private(path: &str) -> bool {
    !is_public(path)
}

/// Role required for a protected path, if any. Private paths with no entry
/// still require a verified token.
pub fn required_role(path: &str) -> Option<Role> {
    if path.starts_with(TOOLS_AGENT_PREFIX)
        || path.starts_with(WS_TOOLS_AGENT_PREFIX)
        || path == EVENTS_WS_PATH
        || path.starts_with(CLIENTS_PREFIX)
    {
        return Some(Role::Agent);
    }
    if path.starts_with(DASHBOARD_PREFIX)
        || path.starts_with(TOOLS_PREFIX)
        || path.starts_with(WS_TOOLS_PREFIX)
    {
        return Some(Role::Admin);
    }
    None
}

/// WebSocket endpoints whose sessions are bounded by token expiry.
pub fn is_secured_stream(path: &str) -> bool {
    path.starts_with(WS_TOOLS_PREFIX) || path == EVENTS_WS_PATH
}
