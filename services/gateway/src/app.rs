//! Gateway HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router and the middleware stack: trace span creation,
//! bearer normalization, then authentication and role enforcement.
use crate::error::gw_no_upstream;
use crate::jwks_client::JwksKeySource;
use crate::security;
use crate::ws;
use axum::response::IntoResponse;
use axum::{Json, Router, middleware};
use shepherd_auth::TokenVerifier;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub verifier: TokenVerifier,
    pub keys: Arc<JwksKeySource>,
}

pub fn build_router(state: AppState) -> Router {
    // Layer order is outermost-last: tracing wraps bearer normalization,
    // which wraps authentication.
    Router::new()
        .route("/health", axum::routing::get(health))
        .route("/ws/events", axum::routing::get(ws::session::upgrade_session))
        .route(
            "/ws/tools/*stream",
            axum::routing::get(ws::session::upgrade_session),
        )
        .fallback(no_upstream)
        .layer(middleware::from_fn_with_state(
            state,
            security::authenticate::authenticate,
        ))
        .layer(middleware::from_fn(security::bearer::resolve_bearer))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Authenticated requests for paths without a local route land here until
/// upstream proxying is wired in.
async fn no_upstream() -> axum::response::Response {
    gw_no_upstream().into_response()
}
