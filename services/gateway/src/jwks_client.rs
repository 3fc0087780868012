//! Cached JWKS lookups against the authserver.
//!
//! # Purpose
//! Backs the gateway's [`TokenVerifier`] with per-tenant public keys fetched
//! from the authserver's JWKS endpoint and cached with a TTL.
//!
//! # Key invariants
//! - This side never signs; `current_signing_key` always fails.
//! - A cache miss during verification surfaces as missing verification keys;
//!   the middleware refreshes the cache before verifying.
use anyhow::{Context, Result};
use dashmap::DashMap;
use jsonwebtoken::DecodingKey;
use shepherd_auth::{
    AuthError, AuthResult, Jwks, TenantId, TenantKeySource, TenantSigningKey,
    TenantVerificationKey,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct JwksKeySource {
    base_url: String,
    client: reqwest::Client,
    cache: Arc<DashMap<String, CachedJwks>>,
    ttl: Duration,
}

#[derive(Clone)]
struct CachedJwks {
    jwks: Jwks,
    expires_at: Instant,
}

impl JwksKeySource {
    pub fn new(base_url: String, ttl: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            cache: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Prime the cache directly. Test seam and warm-start hook.
    pub fn insert_jwks(&self, tenant: &TenantId, jwks: Jwks) {
        self.cache.insert(
            tenant.to_string(),
            CachedJwks {
                jwks,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub async fn refresh(&self, tenant: &TenantId) -> Result<Jwks> {
        let url = format!("{}/oauth/jwks", self.base_url);
        let jwks: Jwks = self
            .client
            .get(url)
            .header("x-tenant-id", tenant.as_str())
            .send()
            .await
            .context("fetch jwks")?
            .error_for_status()
            .context("jwks response status")?
            .json()
            .await
            .context("decode jwks")?;
        self.insert_jwks(tenant, jwks.clone());
        metrics::counter!("gateway_jwks_refresh_total").increment(1);
        Ok(jwks)
    }

    pub async fn ensure_cached(&self, tenant: &TenantId) -> Result<()> {
        if self.cached_jwks(tenant).is_none() {
            self.refresh(tenant).await?;
        }
        Ok(())
    }

    fn cached_jwks(&self, tenant: &TenantId) -> Option<Jwks> {
        self.cache.get(tenant.as_str()).and_then(|entry| {
            if entry.expires_at > Instant::now() {
                Some(entry.jwks.clone())
            } else {
                None
            }
        })
    }
}

impl TenantKeySource for JwksKeySource {
    fn current_signing_key(&self, _tenant: &TenantId) -> AuthResult<TenantSigningKey> {
        Err(AuthError::MissingSigningKey("gateway".to_string()))
    }

    fn verification_keys(&self, tenant: &TenantId) -> AuthResult<Vec<TenantVerificationKey>> {
        let jwks = self
            .cached_jwks(tenant)
            .ok_or_else(|| AuthError::MissingVerificationKeys(tenant.to_string()))?;
        jwks_to_keys(&jwks)
    }
}

fn jwks_to_keys(jwks: &Jwks) -> AuthResult<Vec<TenantVerificationKey>> {
    let mut keys = Vec::with_capacity(jwks.keys.len());
    for key in &jwks.keys {
        let decoding_key = DecodingKey::from_rsa_components(&key.n, &key.e)
            .map_err(|err| AuthError::InvalidKeyMaterial(err.to_string()))?;
        keys.push(TenantVerificationKey {
            kid: key.kid.clone(),
            decoding_key,
        });
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shepherd_auth::{Jwk, generate_signing_key};

    fn source() -> JwksKeySource {
        JwksKeySource::new("http://127.0.0.1:1".to_string(), Duration::from_secs(3600))
    }

    #[test]
    fn jwks_to_keys_rejects_invalid_components() {
        let jwks = Jwks {
            keys: vec![Jwk {
                kty: "RSA".to_string(),
                kid: "k1".to_string(),
                alg: "RS256".to_string(),
                use_field: shepherd_auth::KeyUse::Sig,
                n: "not-base64!".to_string(),
                e: "AQAB".to_string(),
            }],
        };
        match jwks_to_keys(&jwks) {
            Err(AuthError::InvalidKeyMaterial(_)) => {}
            other => panic!("unexpected result: {:?}", other.map(|keys| keys.len())),
        }
    }

    #[test]
    fn signing_side_is_unavailable() {
        match source().current_signing_key(&TenantId::new("t1")) {
            Err(AuthError::MissingSigningKey(side)) => assert_eq!(side, "gateway"),
            other => panic!("unexpected result: {:?}", other.map(|key| key.kid)),
        }
    }

    #[tokio::test]
    async fn ensure_cached_uses_existing_cache() -> Result<()> {
        let source = source();
        let tenant = TenantId::new("t1");
        let key = generate_signing_key().expect("key");
        source.insert_jwks(
            &tenant,
            Jwks {
                keys: vec![Jwk::from_signing_key(&key)],
            },
        );
        // The base URL is unroutable, so this only passes if the cache hit.
        source.ensure_cached(&tenant).await?;
        assert_eq!(source.verification_keys(&tenant).expect("keys").len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn ensure_cached_fetch_fails_when_missing() {
        let source = source();
        assert!(source.ensure_cached(&TenantId::new("t1")).await.is_err());
        match source.verification_keys(&TenantId::new("t1")) {
            Err(AuthError::MissingVerificationKeys(tenant)) => assert_eq!(tenant, "t1"),
            other => panic!("unexpected result: {:?}", other.map(|keys| keys.len())),
        }
    }
}
