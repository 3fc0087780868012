//! Health endpoint.
use crate::api::error::ApiError;
use crate::api::types::HealthStatus;
use crate::app::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service health", body = HealthStatus)
    )
)]
/// Liveness/readiness probe. Checks the client store.
pub(crate) async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    if let Err(err) = state.clients.health_check().await {
        tracing::error!(error = ?err, "client store unavailable");
        return Err(ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: crate::api::types::ErrorResponse {
                code: "internal".to_string(),
                message: "store unavailable".to_string(),
                request_id: None,
            },
        });
    }
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
    }))
}
