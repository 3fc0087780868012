use axum::Router;
use gateway::app::{AppState, build_router};
use gateway::jwks_client::JwksKeySource;
use shepherd_auth::{
    AccessClaims, GrantType, Jwk, Jwks, Role, SigningKey, TenantId, TokenSigner, TokenVerifier,
    generate_signing_key, now_epoch_seconds,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const ISSUER: &str = "https://auth.shepherd.test";
pub const TENANT: &str = "tenant-a";

pub struct TestGateway {
    pub app: Router,
    pub signer: TokenSigner,
    pub keys: Arc<JwksKeySource>,
}

/// Gateway wired against an unroutable authserver, with `TENANT`'s JWKS
/// primed in the cache and a matching signer for minting test tokens.
pub fn gateway_with_tenant() -> TestGateway {
    let key = generate_signing_key().expect("key");
    let keys = Arc::new(JwksKeySource::new(
        "http://127.0.0.1:1".to_string(),
        Duration::from_secs(3600),
    ));
    keys.insert_jwks(
        &TenantId::new(TENANT),
        Jwks {
            keys: vec![Jwk::from_signing_key(&key)],
        },
    );

    let verifier = TokenVerifier::new(ISSUER, 0, keys.clone());
    let app = build_router(AppState {
        verifier,
        keys: keys.clone(),
    });

    TestGateway {
        app,
        signer: signer_for(TENANT, key),
        keys,
    }
}

pub fn signer_for(tenant: &str, key: SigningKey) -> TokenSigner {
    let mut map = HashMap::new();
    map.insert(TenantId::new(tenant), key);
    TokenSigner::new(ISSUER, Arc::new(map))
}

pub fn access_token(signer: &TokenSigner, tenant: &str, roles: &[Role], ttl_secs: i64) -> String {
    let now = now_epoch_seconds();
    signer
        .sign_access(&AccessClaims {
            iss: ISSUER.to_string(),
            sub: "client-1".to_string(),
            iat: now,
            exp: now + ttl_secs,
            tenant_id: tenant.to_string(),
            machine_id: Some("machine-1".to_string()),
            user_id: None,
            grant_type: Some(GrantType::ClientCredentials),
            roles: roles.to_vec(),
        })
        .expect("sign access token")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
