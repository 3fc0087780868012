//! Authserver HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::auth::grants::GrantDispatcher;
use crate::auth::registry::SigningKeyRegistry;
use crate::observability;
use crate::store::ClientStore;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SigningKeyRegistry>,
    pub clients: Arc<dyn ClientStore>,
    pub dispatcher: Arc<GrantDispatcher>,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    Router::new()
        .route("/oauth/token", axum::routing::post(api::token::issue_token))
        .route("/oauth/jwks", axum::routing::get(api::jwks::tenant_jwks))
        .route("/health", axum::routing::get(api::system::health))
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs")
                .url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(trace_layer)
        .with_state(state)
}
