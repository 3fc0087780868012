//! Token signing and verification.
//!
//! # Purpose
//! Implements the RS256 codec both services share: the authserver signs with
//! a tenant's active key, the gateway verifies against that tenant's
//! published keys.
//!
//! # How it fits
//! Key material is abstracted behind [`TenantKeySource`]; the authserver
//! backs it with its in-process registry, the gateway with a JWKS cache.
//!
//! # Key invariants
//! - The signing tenant is resolved from the token itself: `kid` from the
//!   header, `tenant_id` from the payload. Verification then runs against
//!   that tenant's keys only, so a token can never be accepted under another
//!   tenant's key set.
//! - Verification errors are mutually exclusive: expired, signature-invalid,
//!   or malformed. Expiry is only reported for tokens whose signature checked
//!   out.
use crate::claims::{AccessClaims, RefreshClaims};
use crate::errors::{AuthError, AuthResult};
use crate::keys::SigningKey;
use crate::types::TenantId;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

/// Private key handle for one tenant's active signing key.
#[derive(Clone)]
pub struct TenantSigningKey {
    pub kid: String,
    pub encoding_key: EncodingKey,
}

impl TenantSigningKey {
    pub fn from_material(key: &SigningKey) -> AuthResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key_pem.as_bytes())
            .map_err(|err| AuthError::InvalidKeyMaterial(err.to_string()))?;
        Ok(Self {
            kid: key.kid.clone(),
            encoding_key,
        })
    }
}

/// Public key handle used during verification.
#[derive(Clone)]
pub struct TenantVerificationKey {
    pub kid: String,
    pub decoding_key: DecodingKey,
}

impl TenantVerificationKey {
    pub fn from_material(key: &SigningKey) -> AuthResult<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(key.public_key_pem.as_bytes())
            .map_err(|err| AuthError::InvalidKeyMaterial(err.to_string()))?;
        Ok(Self {
            kid: key.kid.clone(),
            decoding_key,
        })
    }
}

/// Source of per-tenant key material.
///
/// The signing side may be unavailable (a verifying edge never signs); such
/// implementations return `AuthError::MissingSigningKey`.
pub trait TenantKeySource: Send + Sync {
    fn current_signing_key(&self, tenant: &TenantId) -> AuthResult<TenantSigningKey>;
    fn verification_keys(&self, tenant: &TenantId) -> AuthResult<Vec<TenantVerificationKey>>;
}

/// Static key source for tests and single-process setups.
impl TenantKeySource for HashMap<TenantId, SigningKey> {
    fn current_signing_key(&self, tenant: &TenantId) -> AuthResult<TenantSigningKey> {
        let key = self
            .get(tenant)
            .ok_or_else(|| AuthError::MissingSigningKey(tenant.to_string()))?;
        TenantSigningKey::from_material(key)
    }

    fn verification_keys(&self, tenant: &TenantId) -> AuthResult<Vec<TenantVerificationKey>> {
        let key = self
            .get(tenant)
            .ok_or_else(|| AuthError::MissingVerificationKeys(tenant.to_string()))?;
        Ok(vec![TenantVerificationKey::from_material(key)?])
    }
}

/// Claims that carry a tenant, checked against the resolved tenant after
/// signature verification.
trait TenantScoped {
    fn tenant_id(&self) -> &str;
}

impl TenantScoped for AccessClaims {
    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

impl TenantScoped for RefreshClaims {
    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

/// Signs access and refresh tokens with the owning tenant's active key.
#[derive(Clone)]
pub struct TokenSigner {
    issuer: String,
    keys: Arc<dyn TenantKeySource>,
}

impl TokenSigner {
    pub fn new(issuer: impl Into<String>, keys: Arc<dyn TenantKeySource>) -> Self {
        Self {
            issuer: issuer.into(),
            keys,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn sign_access(&self, claims: &AccessClaims) -> AuthResult<String> {
        self.sign(&claims.tenant_id, claims)
    }

    pub fn sign_refresh(&self, claims: &RefreshClaims) -> AuthResult<String> {
        self.sign(&claims.tenant_id, claims)
    }

    fn sign<T: Serialize>(&self, tenant_id: &str, claims: &T) -> AuthResult<String> {
        if tenant_id.trim().is_empty() {
            return Err(AuthError::TenantResolution(
                "empty tenant on signing request".to_string(),
            ));
        }
        let tenant = TenantId::new(tenant_id);
        let key = self.keys.current_signing_key(&tenant)?;
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(key.kid.clone());
        encode(&header, claims, &key.encoding_key).map_err(map_jwt_error)
    }
}

/// Verifies tokens against the signing tenant's published keys.
#[derive(Clone)]
pub struct TokenVerifier {
    issuer: String,
    leeway_secs: u64,
    keys: Arc<dyn TenantKeySource>,
}

impl TokenVerifier {
    pub fn new(
        issuer: impl Into<String>,
        leeway_secs: u64,
        keys: Arc<dyn TenantKeySource>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            leeway_secs,
            keys,
        }
    }

    /// Resolve the signing tenant from an unverified token payload.
    ///
    /// The value is only trusted after full verification against that
    /// tenant's keys: a forged `tenant_id` routes verification to keys that
    /// will reject the signature.
    pub fn peek_tenant(token: &str) -> AuthResult<TenantId> {
        let mut parts = token.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return Err(AuthError::TokenMalformed),
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::TokenMalformed)?;

        #[derive(serde::Deserialize)]
        struct TenantOnly {
            tenant_id: String,
        }
        let claims: TenantOnly =
            serde_json::from_slice(&bytes).map_err(|_| AuthError::TokenMalformed)?;
        if claims.tenant_id.trim().is_empty() {
            return Err(AuthError::TenantResolution(
                "empty tenant_id claim".to_string(),
            ));
        }
        Ok(TenantId::new(claims.tenant_id))
    }

    /// Verify an access token, resolving the tenant from the payload.
    pub fn verify_access(&self, token: &str) -> AuthResult<AccessClaims> {
        let tenant = Self::peek_tenant(token)?;
        self.verify_claims(&tenant, token)
    }

    /// Verify an access token for a tenant the caller resolved externally.
    pub fn verify_access_for(&self, tenant: &TenantId, token: &str) -> AuthResult<AccessClaims> {
        self.verify_claims(tenant, token)
    }

    pub fn verify_refresh(&self, token: &str) -> AuthResult<RefreshClaims> {
        let tenant = Self::peek_tenant(token)?;
        self.verify_claims(&tenant, token)
    }

    fn verify_claims<T>(&self, tenant: &TenantId, token: &str) -> AuthResult<T>
    where
        T: DeserializeOwned + TenantScoped,
    {
        let header = decode_header(token).map_err(map_jwt_error)?;
        let keys = self.keys.verification_keys(tenant)?;
        if keys.is_empty() {
            return Err(AuthError::MissingVerificationKeys(tenant.to_string()));
        }

        // Try the key named by `kid` first, then the rest. Rotated-out keys
        // stay in the set, so pre-rotation tokens keep verifying.
        let mut ordered: Vec<&TenantVerificationKey> = Vec::with_capacity(keys.len());
        if let Some(kid) = header.kid.as_deref() {
            ordered.extend(keys.iter().filter(|key| key.kid == kid));
        }
        ordered.extend(keys.iter().filter(|key| {
            header.kid.as_deref() != Some(key.kid.as_str())
        }));

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.leeway = self.leeway_secs;
        validation.validate_aud = false;

        let mut last_err = AuthError::TokenSignatureInvalid;
        for key in ordered {
            match decode::<T>(token, &key.decoding_key, &validation) {
                Ok(data) => {
                    if data.claims.tenant_id() != tenant.as_str() {
                        return Err(AuthError::TenantMismatch {
                            expected: tenant.to_string(),
                            actual: data.claims.tenant_id().to_string(),
                        });
                    }
                    return Ok(data.claims);
                }
                Err(err) => match map_jwt_error(err) {
                    // Another key in the set may still match the signature.
                    AuthError::TokenSignatureInvalid => {
                        last_err = AuthError::TokenSignatureInvalid;
                    }
                    // Expiry and shape failures are terminal.
                    other => return Err(other),
                },
            }
        }
        Err(last_err)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::TokenSignatureInvalid,
        _ => AuthError::TokenMalformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{GrantType, now_epoch_seconds};
    use crate::keys::generate_signing_key;
    use crate::roles::Role;

    const ISSUER: &str = "https://auth.shepherd.test";

    fn key_source(tenants: &[&str]) -> Arc<HashMap<TenantId, SigningKey>> {
        let mut map = HashMap::new();
        for tenant in tenants {
            map.insert(TenantId::new(*tenant), generate_signing_key().expect("key"));
        }
        Arc::new(map)
    }

    fn access_claims(tenant: &str, exp_offset: i64) -> AccessClaims {
        let now = now_epoch_seconds();
        AccessClaims {
            iss: ISSUER.to_string(),
            sub: "client-1".to_string(),
            iat: now,
            exp: now + exp_offset,
            tenant_id: tenant.to_string(),
            machine_id: Some("machine-1".to_string()),
            user_id: None,
            grant_type: Some(GrantType::ClientCredentials),
            roles: vec![Role::Agent],
        }
    }

    #[test]
    fn sign_and_verify_access_roundtrip() {
        let keys = key_source(&["tenant-a"]);
        let signer = TokenSigner::new(ISSUER, keys.clone());
        let verifier = TokenVerifier::new(ISSUER, 0, keys);

        let token = signer.sign_access(&access_claims("tenant-a", 300)).expect("sign");
        let claims = verifier.verify_access(&token).expect("verify");
        assert_eq!(claims.tenant_id, "tenant-a");
        assert_eq!(claims.machine_id.as_deref(), Some("machine-1"));
        assert_eq!(claims.grant_type, Some(GrantType::ClientCredentials));
    }

    #[test]
    fn sign_and_verify_refresh_roundtrip() {
        let keys = key_source(&["tenant-a"]);
        let signer = TokenSigner::new(ISSUER, keys.clone());
        let verifier = TokenVerifier::new(ISSUER, 0, keys);

        let now = now_epoch_seconds();
        let token = signer
            .sign_refresh(&RefreshClaims {
                iss: ISSUER.to_string(),
                sub: "client-1".to_string(),
                iat: now,
                exp: now + 3600,
                tenant_id: "tenant-a".to_string(),
                refresh_count: 3,
            })
            .expect("sign");
        let claims = verifier.verify_refresh(&token).expect("verify");
        assert_eq!(claims.refresh_count, 3);
    }

    #[test]
    fn expired_token_reports_expired_not_malformed() {
        let keys = key_source(&["tenant-a"]);
        let signer = TokenSigner::new(ISSUER, keys.clone());
        let verifier = TokenVerifier::new(ISSUER, 0, keys);

        let token = signer.sign_access(&access_claims("tenant-a", -300)).expect("sign");
        match verifier.verify_access(&token) {
            Err(AuthError::TokenExpired) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn garbage_token_reports_malformed() {
        let keys = key_source(&["tenant-a"]);
        let verifier = TokenVerifier::new(ISSUER, 0, keys);
        match verifier.verify_access("not-a-token") {
            Err(AuthError::TokenMalformed) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn foreign_signature_reports_signature_invalid() {
        let keys_a = key_source(&["tenant-a"]);
        let signer = TokenSigner::new(ISSUER, keys_a);

        // Same tenant name, different key material on the verifying side.
        let mut other = HashMap::new();
        other.insert(TenantId::new("tenant-a"), generate_signing_key().expect("key"));
        let verifier = TokenVerifier::new(ISSUER, 0, Arc::new(other));

        let token = signer.sign_access(&access_claims("tenant-a", 300)).expect("sign");
        match verifier.verify_access(&token) {
            Err(AuthError::TokenSignatureInvalid) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn token_for_unknown_tenant_is_rejected() {
        let keys_a = key_source(&["tenant-a"]);
        let keys_b = key_source(&["tenant-b"]);
        let signer = TokenSigner::new(ISSUER, keys_a);
        let verifier = TokenVerifier::new(ISSUER, 0, keys_b);

        let token = signer.sign_access(&access_claims("tenant-a", 300)).expect("sign");
        match verifier.verify_access(&token) {
            Err(AuthError::MissingVerificationKeys(tenant)) => assert_eq!(tenant, "tenant-a"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn tenant_mismatch_detected_after_decode() {
        // Both tenants share key material so the signature verifies and the
        // claim comparison is what rejects the token.
        let key = generate_signing_key().expect("key");
        let mut map = HashMap::new();
        map.insert(TenantId::new("tenant-a"), key.clone());
        map.insert(TenantId::new("tenant-b"), key);
        let source = Arc::new(map);

        let signer = TokenSigner::new(ISSUER, source.clone());
        let verifier = TokenVerifier::new(ISSUER, 0, source);
        let token = signer.sign_access(&access_claims("tenant-a", 300)).expect("sign");

        match verifier.verify_access_for(&TenantId::new("tenant-b"), &token) {
            Err(AuthError::TenantMismatch { expected, actual }) => {
                assert_eq!(expected, "tenant-b");
                assert_eq!(actual, "tenant-a");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn signing_with_empty_tenant_fails_closed() {
        let keys = key_source(&["tenant-a"]);
        let signer = TokenSigner::new(ISSUER, keys);
        match signer.sign_access(&access_claims("  ", 300)) {
            Err(AuthError::TenantResolution(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn peek_tenant_rejects_missing_payload_tenant() {
        let header = URL_SAFE_NO_PAD.encode(b"{\"alg\":\"RS256\"}");
        let payload = URL_SAFE_NO_PAD.encode(b"{\"sub\":\"x\"}");
        let token = format!("{header}.{payload}.sig");
        match TokenVerifier::peek_tenant(&token) {
            Err(AuthError::TokenMalformed) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
