//! Token endpoint handler.
//!
//! # Security considerations
//! - Every grant-validation failure returns the same generic 401 body; the
//!   specific cause is logged server-side only.
use crate::api::error::{ApiError, api_internal, api_invalid_grant, api_unsupported_grant_type};
use crate::app::AppState;
use axum::extract::State;
use axum::{Form, Json};
use serde::Serialize;
use shepherd_auth::AuthError;
use utoipa::ToSchema;

pub use crate::auth::grants::TokenRequest;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[utoipa::path(
    post,
    path = "/oauth/token",
    tag = "oauth",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token pair issued", body = TokenResponse),
        (status = 400, description = "Unsupported grant type", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Invalid grant", body = crate::api::types::ErrorResponse)
    )
)]
/// Issue an access/refresh token pair for a machine client.
///
/// # Errors
/// - 400 for an unknown `grant_type`.
/// - 401 for every credential or refresh-token validation failure.
pub(crate) async fn issue_token(
    State(state): State<AppState>,
    Form(request): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    match state.dispatcher.dispatch(&request).await {
        Ok(tokens) => Ok(Json(TokenResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.expires_in,
        })),
        Err(AuthError::UnsupportedGrantType(value)) => {
            tracing::warn!(grant_type = %value, "unsupported grant type requested");
            Err(api_unsupported_grant_type())
        }
        Err(err @ AuthError::Internal(_)) => {
            Err(api_internal("token issuance unavailable", &err))
        }
        Err(err) => {
            // Precise record for operators, uniform response for callers.
            tracing::warn!(
                error = %err,
                grant_type = %request.grant_type,
                "token grant rejected"
            );
            metrics::counter!("authserver_grants_rejected_total").increment(1);
            Err(api_invalid_grant())
        }
    }
}
