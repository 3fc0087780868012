//! Client store traits and error types.
//!
//! # Purpose
//! Abstracts persistence of registered machine clients behind an async trait
//! so handlers and the grant dispatcher stay backend-agnostic.
//!
//! # Notes
//! Client registration itself happens in an external provisioning flow; this
//! service only reads client records and verifies their secret hashes.
use async_trait::async_trait;
use shepherd_auth::Role;
use thiserror::Error;

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Registered machine client.
///
/// `client_secret_hash` is a bcrypt hash; the plaintext secret is never
/// stored. `roles` are the assigned roles copied into machine access tokens.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret_hash: String,
    pub machine_id: String,
    pub tenant_id: String,
    pub roles: Vec<Role>,
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn find_by_client_id(&self, client_id: &str) -> StoreResult<Option<OAuthClient>>;
    async fn insert_client(&self, client: OAuthClient) -> StoreResult<()>;
    async fn health_check(&self) -> StoreResult<()>;
}
