//! Claim schemas for access and refresh tokens.
//!
//! # Purpose
//! Defines the exact JSON payloads minted by the authserver and checked by
//! the gateway. Access tokens describe a machine client or a dashboard user;
//! refresh tokens carry only enough to re-issue a pair.
//!
//! # Key invariants
//! - Every token carries exactly one `tenant_id`.
//! - `roles` in access claims are already effective (expansion happens at
//!   composition time, never at verification time).
//! - Refresh claims have no `roles` field, so a refresh token never grants
//!   access by itself.
use crate::errors::AuthError;
use crate::roles::Role;
use serde::{Deserialize, Serialize};

/// OAuth-style grant identifier accepted by the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    ClientCredentials,
    RefreshToken,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::ClientCredentials => "client_credentials",
            GrantType::RefreshToken => "refresh_token",
        }
    }
}

impl std::str::FromStr for GrantType {
    type Err = AuthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "client_credentials" => Ok(GrantType::ClientCredentials),
            "refresh_token" => Ok(GrantType::RefreshToken),
            other => Err(AuthError::UnsupportedGrantType(other.to_string())),
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access token payload.
///
/// Machine tokens set `machine_id` and `grant_type`; dashboard tokens set
/// `user_id`. Both carry effective `roles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub tenant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_type: Option<GrantType>,
    pub roles: Vec<Role>,
}

impl AccessClaims {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Seconds remaining before `exp`, negative once past it.
    pub fn seconds_until_expiry(&self, now: i64) -> i64 {
        self.exp - now
    }
}

/// Refresh token payload. `refresh_count` bounds chain length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub tenant_id: String,
    pub refresh_count: u32,
}

/// Current wall-clock time as epoch seconds.
pub fn now_epoch_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}
