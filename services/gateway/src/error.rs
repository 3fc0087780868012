//! Gateway error responses.
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct GatewayError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Generic 401. The specific verification failure is logged server-side.
pub fn gw_unauthorized() -> GatewayError {
    GatewayError {
        status: StatusCode::UNAUTHORIZED,
        body: ErrorResponse {
            code: "unauthorized".to_string(),
            message: "authentication required".to_string(),
        },
    }
}

pub fn gw_forbidden() -> GatewayError {
    GatewayError {
        status: StatusCode::FORBIDDEN,
        body: ErrorResponse {
            code: "forbidden".to_string(),
            message: "insufficient role".to_string(),
        },
    }
}

/// 502 for private paths with no upstream wired; request routing lives
/// outside this service.
pub fn gw_no_upstream() -> GatewayError {
    GatewayError {
        status: StatusCode::BAD_GATEWAY,
        body: ErrorResponse {
            code: "bad_gateway".to_string(),
            message: "no upstream configured for path".to_string(),
        },
    }
}
