//! JWKS wire types (RFC 7517 subset, RSA signing keys only).
use crate::keys::SigningKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyUse {
    Sig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: String,
    pub alg: String,
    #[serde(rename = "use")]
    pub use_field: KeyUse,
    pub n: String,
    pub e: String,
}

impl Jwk {
    /// Public projection of a signing key. Never includes private material.
    pub fn from_signing_key(key: &SigningKey) -> Self {
        Self {
            kty: "RSA".to_string(),
            kid: key.kid.clone(),
            alg: "RS256".to_string(),
            use_field: KeyUse::Sig,
            n: key.n.clone(),
            e: key.e.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}
