//! Bearer credential normalization.
//!
//! # Purpose
//! Lets callers present their access token as a cookie, a custom header, or
//! a query parameter and normalizes it into a standard `Authorization`
//! header before authentication runs.
//!
//! # Key invariants
//! - An existing `Authorization` header always wins; nothing is overwritten.
//! - Precedence among fallbacks: `access_token` cookie, then `Access-Token`
//!   header, then the `authorization` query parameter.
//! - This middleware never rejects a request. A request with no resolvable
//!   credential passes through untouched and fails authentication downstream.
//! - Public paths are not inspected at all.
use crate::security::paths;
use axum::extract::Request;
use axum::http::{HeaderValue, Uri, header};
use axum::middleware::Next;
use axum::response::Response;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const ACCESS_TOKEN_HEADER: &str = "access-token";
pub const AUTHORIZATION_QUERY_PARAM: &str = "authorization";

pub async fn resolve_bearer(request: Request, next: Next) -> Response {
    next.run(normalize(request)).await
}

fn normalize(mut request: Request) -> Request {
    let path = request.uri().path().to_string();
    if !paths::is_private(&path) {
        return request;
    }
    if request.headers().contains_key(header::AUTHORIZATION) {
        return request;
    }

    let resolved = token_from_cookie(&request)
        .map(|token| (token, "cookie"))
        .or_else(|| token_from_header(&request).map(|token| (token, "header")))
        .or_else(|| token_from_query(request.uri()).map(|token| (token, "query")));

    if let Some((token, source)) = resolved {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => {
                request.headers_mut().insert(header::AUTHORIZATION, value);
                metrics::counter!("gateway_bearer_resolved_total", "source" => source)
                    .increment(1);
            }
            Err(_) => {
                // Unusable credential material; leave the request untouched
                // and let authentication reject it.
                tracing::debug!(source, "resolved token not header-safe, skipping");
            }
        }
    }
    request
}

fn token_from_cookie(request: &Request) -> Option<String> {
    let cookies = request.headers().get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(ACCESS_TOKEN_COOKIE)?.strip_prefix('='))
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

fn token_from_header(request: &Request) -> Option<String> {
    request
        .headers()
        .get(ACCESS_TOKEN_HEADER)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

fn token_from_query(uri: &Uri) -> Option<String> {
    uri.query()?
        .split('&')
        .find_map(|pair| pair.strip_prefix(AUTHORIZATION_QUERY_PARAM)?.strip_prefix('='))
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}
