//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so error shapes stay uniform
//! across endpoints.
//!
//! # Security considerations
//! - Grant failures log their specific cause server-side but collapse to a
//!   generic `invalid_grant` body, so wrong-secret and unknown-client are
//!   indistinguishable to a caller.
use crate::api::types::ErrorResponse;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use shepherd_auth::AuthError;

/// Structured API error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Generic 401 for every credential or refresh validation failure.
///
/// The message is fixed: it must not vary with the failure cause.
pub fn api_invalid_grant() -> ApiError {
    ApiError {
        status: StatusCode::UNAUTHORIZED,
        body: ErrorResponse {
            code: "invalid_grant".to_string(),
            message: "invalid client credentials".to_string(),
            request_id: None,
        },
    }
}

/// 400 for a grant_type this server does not implement.
pub fn api_unsupported_grant_type() -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        body: ErrorResponse {
            code: "unsupported_grant_type".to_string(),
            message: "grant type not supported".to_string(),
            request_id: None,
        },
    }
}

/// 500 when the tenant cannot be resolved. Fail closed; never fall back to a
/// default tenant.
pub fn api_tenant_unresolved() -> ApiError {
    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorResponse {
            code: "tenant_unresolved".to_string(),
            message: "tenant id not resolved for request".to_string(),
            request_id: None,
        },
    }
}

/// 500 with server-side logging of the underlying cause.
pub fn api_internal(message: &str, err: &AuthError) -> ApiError {
    tracing::error!(error = %err, "authserver internal error");
    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorResponse {
            code: "internal".to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}
