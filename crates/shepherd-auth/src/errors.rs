//! Error taxonomy shared by token issuance and verification.
//!
//! Verification failures are deliberately split three ways (expired,
//! malformed, signature) so callers can log precisely while returning a
//! uniform response to clients.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("tenant could not be resolved: {0}")]
    TenantResolution(String),
    #[error("unsupported grant type: {0}")]
    UnsupportedGrantType(String),
    #[error("unknown client: {0}")]
    ClientNotFound(String),
    #[error("client secret mismatch for {0}")]
    InvalidClientSecret(String),
    #[error("token expired")]
    TokenExpired,
    #[error("token malformed")]
    TokenMalformed,
    #[error("token signature invalid")]
    TokenSignatureInvalid,
    #[error("refresh count {count} reached limit {max}")]
    MaxRefreshCountExceeded { count: u32, max: u32 },
    #[error("no bearer token on request")]
    NoBearerToken,
    #[error("missing signing key for tenant {0}")]
    MissingSigningKey(String),
    #[error("no verification keys for tenant {0}")]
    MissingVerificationKeys(String),
    #[error("token tenant mismatch: expected {expected}, got {actual}")]
    TenantMismatch { expected: String, actual: String },
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
    #[error("internal: {0}")]
    Internal(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
