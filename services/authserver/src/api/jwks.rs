//! Per-tenant JWKS endpoint.
use crate::api::error::{ApiError, api_internal, api_tenant_unresolved};
use crate::app::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Serialize;
use shepherd_auth::{Jwks, TenantId};
use utoipa::ToSchema;

pub const TENANT_HEADER: &str = "x-tenant-id";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JwkResponse {
    pub kty: String,
    pub kid: String,
    pub alg: String,
    #[serde(rename = "use")]
    pub use_field: String,
    pub n: String,
    pub e: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JwksResponse {
    pub keys: Vec<JwkResponse>,
}

impl From<Jwks> for JwksResponse {
    fn from(jwks: Jwks) -> Self {
        Self {
            keys: jwks
                .keys
                .into_iter()
                .map(|key| JwkResponse {
                    kty: key.kty,
                    kid: key.kid,
                    alg: key.alg,
                    use_field: "sig".to_string(),
                    n: key.n,
                    e: key.e,
                })
                .collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/oauth/jwks",
    tag = "oauth",
    responses(
        (status = 200, description = "Public signing keys for the tenant", body = JwksResponse),
        (status = 500, description = "Tenant not resolved", body = crate::api::types::ErrorResponse)
    )
)]
/// Return the tenant's public signing keys, creating the key on first use.
///
/// The tenant comes from the `X-Tenant-Id` header set by the edge. A request
/// without a resolvable tenant is a hard failure, never a fallback key.
///
/// # Errors
/// - 500 if the tenant header is missing or blank, or key access fails.
pub(crate) async fn tenant_jwks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<JwksResponse>, ApiError> {
    let tenant = headers
        .get(TENANT_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let Some(tenant) = tenant else {
        tracing::error!("jwks requested without a resolvable tenant");
        return Err(api_tenant_unresolved());
    };

    let jwks = state
        .registry
        .jwks(&TenantId::new(tenant))
        .map_err(|err| api_internal("signing keys unavailable", &err))?;
    Ok(Json(JwksResponse::from(jwks)))
}
