//! Claim composition for machine and dashboard access tokens.
//!
//! Role expansion for dashboard users is a pure function over the assigned
//! roles; nothing here mutates stored records or keeps per-request state.
use crate::store::OAuthClient;
use shepherd_auth::{AccessClaims, GrantType, Role, effective_roles};

#[derive(Clone)]
pub struct ClaimsComposer {
    issuer: String,
    access_ttl_secs: i64,
}

impl ClaimsComposer {
    pub fn new(issuer: impl Into<String>, access_ttl_secs: i64) -> Self {
        Self {
            issuer: issuer.into(),
            access_ttl_secs,
        }
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    /// Claims for a machine client. Roles are copied from the client record;
    /// the grant that produced the token is recorded in the payload.
    pub fn machine_access(&self, client: &OAuthClient, grant: GrantType, now: i64) -> AccessClaims {
        AccessClaims {
            iss: self.issuer.clone(),
            sub: client.client_id.clone(),
            iat: now,
            exp: now + self.access_ttl_secs,
            tenant_id: client.tenant_id.clone(),
            machine_id: Some(client.machine_id.clone()),
            user_id: None,
            grant_type: Some(grant),
            roles: client.roles.clone(),
        }
    }

    /// Claims for a dashboard user authenticated by the external login flow.
    /// Owner is expanded to include Admin.
    pub fn dashboard_access(
        &self,
        tenant_id: &str,
        user_id: &str,
        assigned: &[Role],
        now: i64,
    ) -> AccessClaims {
        AccessClaims {
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.access_ttl_secs,
            tenant_id: tenant_id.to_string(),
            machine_id: None,
            user_id: Some(user_id.to_string()),
            grant_type: None,
            roles: effective_roles(assigned),
        }
    }
}
