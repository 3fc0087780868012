//! Shepherd authn primitives shared by the authserver and the gateway.
//!
//! # Purpose
//! Centralizes the claim schemas, per-tenant RSA key material, and the token
//! signing/verification codec used across services.
//!
//! # How it fits
//! The authserver mints tokens and publishes per-tenant JWKS documents; the
//! gateway verifies tokens and enforces role requirements using shared types
//! from this crate.
//!
//! # Key invariants
//! - Shepherd tokens are RS256 only; every token carries exactly one tenant.
//! - JWKS documents publish public key material only.
//! - Issuer values must be consistent between signer and verifier.

mod claims;
mod codec;
mod errors;
mod jwks;
mod keys;
mod roles;
mod types;

pub use claims::{AccessClaims, GrantType, RefreshClaims, now_epoch_seconds};
pub use codec::{
    TenantKeySource, TenantSigningKey, TenantVerificationKey, TokenSigner, TokenVerifier,
};
pub use errors::{AuthError, AuthResult};
pub use jwks::{Jwk, Jwks, KeyUse};
pub use keys::{RSA_KEY_BITS, SigningKey, generate_signing_key};
pub use roles::{Role, effective_roles};
pub use types::TenantId;
