//! Token verification and role enforcement middleware.
//!
//! # Purpose
//! Runs after bearer normalization: extracts the `Authorization` bearer,
//! resolves the signing tenant from the token, verifies it against that
//! tenant's JWKS, and enforces the role the path requires.
//!
//! # Key invariants
//! - Public paths bypass verification entirely.
//! - Every verification failure maps to the same 401 body; the specific
//!   failure is only logged.
//! - Role failures are 403, never 401: the caller proved who they are but
//!   not that they may be here.
use crate::app::AppState;
use crate::error::{gw_forbidden, gw_unauthorized};
use crate::security::paths;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use shepherd_auth::{AccessClaims, AuthError, TokenVerifier};

pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if paths::is_public(&path) {
        return next.run(request).await;
    }

    // Detach the token from the request so nothing borrowed from the body
    // crosses the verification awaits.
    let token = bearer_token(&request).map(str::to_owned);
    let claims = match verify_request(&state, &path, token).await {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    if let Some(role) = paths::required_role(&path) {
        if !claims.has_role(role) {
            metrics::counter!("gateway_requests_forbidden_total").increment(1);
            tracing::warn!(path, sub = %claims.sub, ?role, "role requirement not met");
            return gw_forbidden().into_response();
        }
    }

    request.extensions_mut().insert(claims);
    next.run(request).await
}

async fn verify_request(
    state: &AppState,
    path: &str,
    token: Option<String>,
) -> Result<AccessClaims, Response> {
    let token = token.ok_or_else(|| {
        metrics::counter!("gateway_requests_unauthorized_total", "reason" => "no_token")
            .increment(1);
        tracing::warn!(path, error = %AuthError::NoBearerToken, "request rejected");
        gw_unauthorized().into_response()
    })?;

    let tenant = TokenVerifier::peek_tenant(&token).map_err(|err| {
        metrics::counter!("gateway_requests_unauthorized_total", "reason" => "tenant")
            .increment(1);
        tracing::warn!(path, error = %err, "tenant resolution failed");
        gw_unauthorized().into_response()
    })?;

    if let Err(err) = state.keys.ensure_cached(&tenant).await {
        metrics::counter!("gateway_requests_unauthorized_total", "reason" => "jwks")
            .increment(1);
        tracing::warn!(path, tenant = %tenant, error = %err, "jwks fetch failed");
        return Err(gw_unauthorized().into_response());
    }

    state.verifier.verify_access_for(&tenant, &token).map_err(|err| {
        metrics::counter!("gateway_requests_unauthorized_total", "reason" => "verify")
            .increment(1);
        tracing::warn!(path, tenant = %tenant, error = %err, "token verification failed");
        gw_unauthorized().into_response()
    })
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
