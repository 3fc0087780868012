//! Per-tenant RSA signing key material.
//!
//! # Purpose
//! Generates and carries the key material backing token signatures and JWKS
//! documents. Private PEM never leaves the process; the JWKS components are
//! precomputed at generation time so the public path never touches the
//! private key.
//!
//! # Security
//! - Keys are RSA 2048, one active key per tenant, rotated by replacing the
//!   active key while retaining predecessors for verification.
//! - `kid` values are random and carry no tenant information.
use crate::errors::{AuthError, AuthResult};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

pub const RSA_KEY_BITS: usize = 2048;

/// RSA key pair plus the derived JWK components.
#[derive(Debug, Clone)]
pub struct SigningKey {
    pub kid: String,
    pub private_key_pem: String,
    pub public_key_pem: String,
    /// Base64url (no pad) big-endian modulus.
    pub n: String,
    /// Base64url (no pad) big-endian public exponent.
    pub e: String,
    pub created_at: i64,
}

/// Generate a fresh RSA signing key with a random `kid`.
///
/// # Errors
/// - `AuthError::KeyGeneration` if RSA generation or PEM encoding fails.
pub fn generate_signing_key() -> AuthResult<SigningKey> {
    let private = RsaPrivateKey::new(&mut rand::thread_rng(), RSA_KEY_BITS)
        .map_err(|err| AuthError::KeyGeneration(err.to_string()))?;
    let public = RsaPublicKey::from(&private);

    let private_key_pem = private
        .to_pkcs1_pem(Default::default())
        .map_err(|err| AuthError::KeyGeneration(err.to_string()))?
        .to_string();
    let public_key_pem = public
        .to_pkcs1_pem(Default::default())
        .map_err(|err| AuthError::KeyGeneration(err.to_string()))?;

    let mut kid_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut kid_bytes);

    Ok(SigningKey {
        kid: hex::encode(kid_bytes),
        private_key_pem,
        public_key_pem,
        n: URL_SAFE_NO_PAD.encode(public.n().to_bytes_be()),
        e: URL_SAFE_NO_PAD.encode(public.e().to_bytes_be()),
        created_at: crate::claims::now_epoch_seconds(),
    })
}
