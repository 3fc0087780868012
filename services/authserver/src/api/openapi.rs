//! OpenAPI schema aggregation for the authserver API.
use crate::api::jwks::{self, JwkResponse, JwksResponse};
use crate::api::system;
use crate::api::token::{self, TokenRequest, TokenResponse};
use crate::api::types::{ErrorResponse, HealthStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "shepherd-authserver",
        version = "v1",
        description = "Shepherd token issuance HTTP API"
    ),
    paths(token::issue_token, jwks::tenant_jwks, system::health),
    components(schemas(
        TokenRequest,
        TokenResponse,
        JwkResponse,
        JwksResponse,
        ErrorResponse,
        HealthStatus
    ))
)]
pub struct ApiDoc;
