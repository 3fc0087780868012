//! Per-tenant signing key registry.
//!
//! # Purpose
//! Owns the lifecycle of every tenant's RSA signing keys: lazy creation on
//! first use, rotation, and the public JWKS projection.
//!
//! # Key invariants
//! - One active key per tenant; rotated-out keys remain available for
//!   verification so outstanding tokens survive rotation.
//! - Creation is atomic per tenant: concurrent first requests for the same
//!   tenant observe a single winning key, and no tenant ever blocks another.
//! - An unresolved (empty) tenant is an error; there is no default tenant and
//!   no fallback key.
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use shepherd_auth::{
    AuthError, AuthResult, Jwk, Jwks, SigningKey, TenantId, TenantKeySource, TenantSigningKey,
    TenantVerificationKey, generate_signing_key,
};
use std::sync::Arc;

/// Active key plus retained predecessors for one tenant.
#[derive(Clone)]
pub struct TenantKeySet {
    pub current: SigningKey,
    pub previous: Vec<SigningKey>,
}

impl TenantKeySet {
    /// All keys, active first. Verification walks this order.
    fn all_keys(&self) -> impl Iterator<Item = &SigningKey> {
        std::iter::once(&self.current).chain(self.previous.iter())
    }
}

#[derive(Default)]
pub struct SigningKeyRegistry {
    slots: DashMap<String, Arc<TenantKeySet>>,
}

impl SigningKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolved(tenant: &TenantId) -> AuthResult<&str> {
        let value = tenant.as_str().trim();
        if value.is_empty() {
            return Err(AuthError::TenantResolution(
                "tenant id not resolved for key request".to_string(),
            ));
        }
        Ok(value)
    }

    /// Return the tenant's active signing key, creating it on first use.
    ///
    /// Racing callers may both generate a key, but only one lands in the
    /// slot; the loser's key is discarded and both observe the winner.
    pub fn get_or_create_active(&self, tenant: &TenantId) -> AuthResult<SigningKey> {
        let tenant_key = Self::resolved(tenant)?;
        if let Some(slot) = self.slots.get(tenant_key) {
            return Ok(slot.current.clone());
        }
        let generated = generate_signing_key()?;
        let slot = self
            .slots
            .entry(tenant_key.to_string())
            .or_insert_with(|| {
                metrics::counter!("authserver_signing_keys_created_total").increment(1);
                Arc::new(TenantKeySet {
                    current: generated,
                    previous: Vec::new(),
                })
            });
        Ok(slot.current.clone())
    }

    /// Replace the tenant's active key, retaining the old one for
    /// verification. Creates the slot if the tenant had no key yet.
    pub fn rotate(&self, tenant: &TenantId) -> AuthResult<SigningKey> {
        let tenant_key = Self::resolved(tenant)?;
        let fresh = generate_signing_key()?;
        match self.slots.entry(tenant_key.to_string()) {
            Entry::Occupied(mut slot) => {
                let old = slot.get().clone();
                let mut previous = old.previous.clone();
                previous.push(old.current.clone());
                slot.insert(Arc::new(TenantKeySet {
                    current: fresh.clone(),
                    previous,
                }));
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(TenantKeySet {
                    current: fresh.clone(),
                    previous: Vec::new(),
                }));
            }
        }
        metrics::counter!("authserver_signing_keys_rotated_total").increment(1);
        Ok(fresh)
    }

    /// Public JWKS document for the tenant. Creates the key on first request
    /// so a verifier can prime itself before the first token is minted.
    pub fn jwks(&self, tenant: &TenantId) -> AuthResult<Jwks> {
        self.get_or_create_active(tenant)?;
        let tenant_key = Self::resolved(tenant)?;
        let slot = self
            .slots
            .get(tenant_key)
            .ok_or_else(|| AuthError::MissingSigningKey(tenant.to_string()))?;
        Ok(Jwks {
            keys: slot.all_keys().map(Jwk::from_signing_key).collect(),
        })
    }

    pub fn tenant_count(&self) -> usize {
        self.slots.len()
    }
}

impl TenantKeySource for SigningKeyRegistry {
    fn current_signing_key(&self, tenant: &TenantId) -> AuthResult<TenantSigningKey> {
        let key = self.get_or_create_active(tenant)?;
        TenantSigningKey::from_material(&key)
    }

    fn verification_keys(&self, tenant: &TenantId) -> AuthResult<Vec<TenantVerificationKey>> {
        self.get_or_create_active(tenant)?;
        let tenant_key = Self::resolved(tenant)?;
        let slot = self
            .slots
            .get(tenant_key)
            .ok_or_else(|| AuthError::MissingVerificationKeys(tenant.to_string()))?;
        slot.all_keys()
            .map(TenantVerificationKey::from_material)
            .collect()
    }
}
