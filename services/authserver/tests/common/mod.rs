use authserver::app::{AppState, build_router};
use authserver::auth::composer::ClaimsComposer;
use authserver::auth::grants::GrantDispatcher;
use authserver::auth::registry::SigningKeyRegistry;
use authserver::store::memory::InMemoryStore;
use authserver::store::{ClientStore, OAuthClient};
use axum::Router;
use shepherd_auth::{Role, TokenSigner, TokenVerifier};
use std::sync::Arc;

pub const ISSUER: &str = "https://auth.shepherd.test";

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Router plus state with one seeded machine client
/// (`client-1` / `s3cret`, tenant `tenant-a`, role AGENT).
pub async fn app_with_client(max_refresh_count: u32) -> (Router, AppState) {
    let registry = Arc::new(SigningKeyRegistry::new());
    let clients = Arc::new(InMemoryStore::new());
    clients
        .insert_client(OAuthClient {
            client_id: "client-1".to_string(),
            client_secret_hash: bcrypt::hash("s3cret", 4).expect("hash"),
            machine_id: "machine-1".to_string(),
            tenant_id: "tenant-a".to_string(),
            roles: vec![Role::Agent],
        })
        .await
        .expect("seed client");

    let dispatcher = GrantDispatcher::new(
        clients.clone(),
        ClaimsComposer::new(ISSUER, 900),
        TokenSigner::new(ISSUER, registry.clone()),
        TokenVerifier::new(ISSUER, 0, registry.clone()),
        3600,
        max_refresh_count,
    )
    .expect("dispatcher");

    let state = AppState {
        registry,
        clients,
        dispatcher: Arc::new(dispatcher),
    };
    (build_router(state.clone()), state)
}

/// Decode and verify a token against a JWKS document fetched over the API.
pub fn decode_with_jwks(token: &str, jwks: &serde_json::Value) -> serde_json::Value {
    let kid = jsonwebtoken::decode_header(token)
        .expect("header")
        .kid
        .expect("kid");
    let key = jwks["keys"]
        .as_array()
        .expect("keys")
        .iter()
        .find(|key| key["kid"] == kid.as_str())
        .expect("matching jwk");
    let decoding_key = jsonwebtoken::DecodingKey::from_rsa_components(
        key["n"].as_str().expect("n"),
        key["e"].as_str().expect("e"),
    )
    .expect("decoding key");

    let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::RS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_aud = false;
    jsonwebtoken::decode::<serde_json::Value>(token, &decoding_key, &validation)
        .expect("decode")
        .claims
}
