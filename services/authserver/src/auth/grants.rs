//! Grant dispatch for the token endpoint.
//!
//! # Purpose
//! Validates `client_credentials` and `refresh_token` grants and issues
//! access/refresh token pairs. Each failure is a specific [`AuthError`] so
//! the handler can log precisely while the wire response stays uniform.
//!
//! # Security
//! - Secret checks go through bcrypt; an unknown client still pays for one
//!   comparison against a fixed dummy hash so lookups and mismatches are not
//!   distinguishable by timing.
//! - Refresh chains are bounded by `max_refresh_count`; each hop increments
//!   the count carried in the refresh token itself.
use crate::auth::composer::ClaimsComposer;
use crate::store::{ClientStore, OAuthClient};
use serde::Deserialize;
use shepherd_auth::{
    AuthError, AuthResult, GrantType, RefreshClaims, TokenSigner, TokenVerifier,
    now_epoch_seconds,
};
use std::sync::Arc;
use utoipa::ToSchema;

/// Form body of `POST /oauth/token`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub grant_type: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Signed token pair produced by a successful grant.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

pub struct GrantDispatcher {
    clients: Arc<dyn ClientStore>,
    composer: ClaimsComposer,
    signer: TokenSigner,
    verifier: TokenVerifier,
    refresh_ttl_secs: i64,
    max_refresh_count: u32,
    dummy_secret_hash: String,
}

impl GrantDispatcher {
    pub fn new(
        clients: Arc<dyn ClientStore>,
        composer: ClaimsComposer,
        signer: TokenSigner,
        verifier: TokenVerifier,
        refresh_ttl_secs: i64,
        max_refresh_count: u32,
    ) -> AuthResult<Self> {
        // Hashed once at startup so the unknown-client path runs a real
        // comparison at the same cost as a stored hash.
        let dummy_secret_hash = bcrypt::hash("shepherd.dummy.secret", bcrypt::DEFAULT_COST)
            .map_err(|err| AuthError::Internal(err.to_string()))?;
        Ok(Self {
            clients,
            composer,
            signer,
            verifier,
            refresh_ttl_secs,
            max_refresh_count,
            dummy_secret_hash,
        })
    }

    pub async fn dispatch(&self, request: &TokenRequest) -> AuthResult<IssuedTokens> {
        let grant: GrantType = request.grant_type.parse()?;
        let tokens = match grant {
            GrantType::ClientCredentials => self.client_credentials(request).await?,
            GrantType::RefreshToken => self.refresh(request).await?,
        };
        metrics::counter!("authserver_tokens_issued_total", "grant_type" => grant.as_str())
            .increment(1);
        Ok(tokens)
    }

    async fn client_credentials(&self, request: &TokenRequest) -> AuthResult<IssuedTokens> {
        let client_id = request.client_id.as_deref().unwrap_or_default();
        let secret = request.client_secret.as_deref().unwrap_or_default();

        let client = match self
            .clients
            .find_by_client_id(client_id)
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?
        {
            Some(client) => client,
            None => {
                let _ = bcrypt::verify(secret, &self.dummy_secret_hash);
                return Err(AuthError::ClientNotFound(client_id.to_string()));
            }
        };

        let matches = bcrypt::verify(secret, &client.client_secret_hash)
            .map_err(|err| AuthError::Internal(err.to_string()))?;
        if !matches {
            return Err(AuthError::InvalidClientSecret(client_id.to_string()));
        }

        self.issue(&client, GrantType::ClientCredentials, 0)
    }

    async fn refresh(&self, request: &TokenRequest) -> AuthResult<IssuedTokens> {
        let token = request
            .refresh_token
            .as_deref()
            .ok_or(AuthError::TokenMalformed)?;
        let claims = self.verifier.verify_refresh(token)?;

        if claims.refresh_count >= self.max_refresh_count {
            return Err(AuthError::MaxRefreshCountExceeded {
                count: claims.refresh_count,
                max: self.max_refresh_count,
            });
        }

        let client = self
            .clients
            .find_by_client_id(&claims.sub)
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?
            .ok_or_else(|| AuthError::ClientNotFound(claims.sub.clone()))?;

        // A deleted-and-recreated client under another tenant must not be
        // able to consume the old tenant's refresh tokens.
        if client.tenant_id != claims.tenant_id {
            return Err(AuthError::TenantMismatch {
                expected: claims.tenant_id,
                actual: client.tenant_id,
            });
        }

        self.issue(&client, GrantType::RefreshToken, claims.refresh_count + 1)
    }

    fn issue(
        &self,
        client: &OAuthClient,
        grant: GrantType,
        refresh_count: u32,
    ) -> AuthResult<IssuedTokens> {
        let now = now_epoch_seconds();
        let access = self.composer.machine_access(client, grant, now);
        let access_token = self.signer.sign_access(&access)?;

        let refresh = RefreshClaims {
            iss: self.signer.issuer().to_string(),
            sub: client.client_id.clone(),
            iat: now,
            exp: now + self.refresh_ttl_secs,
            tenant_id: client.tenant_id.clone(),
            refresh_count,
        };
        let refresh_token = self.signer.sign_refresh(&refresh)?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
            expires_in: self.composer.access_ttl_secs(),
        })
    }
}
