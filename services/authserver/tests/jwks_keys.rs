mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{app_with_client, decode_with_jwks, read_json};
use shepherd_auth::TenantId;
use tower::ServiceExt;

fn jwks_request(tenant: Option<&str>) -> Request<Body> {
    let builder = Request::builder().uri("/oauth/jwks");
    let builder = match tenant {
        Some(tenant) => builder.header("x-tenant-id", tenant),
        None => builder,
    };
    builder.body(Body::empty()).expect("request")
}

#[tokio::test]
async fn jwks_without_tenant_fails_closed() {
    let (app, state) = app_with_client(24).await;

    let missing = app
        .clone()
        .oneshot(jwks_request(None))
        .await
        .expect("response");
    assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(missing).await;
    assert_eq!(body["code"], "tenant_unresolved");

    let blank = app.oneshot(jwks_request(Some("  "))).await.expect("response");
    assert_eq!(blank.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // No key slot was created for the failed requests.
    assert_eq!(state.registry.tenant_count(), 0);
}

#[tokio::test]
async fn jwks_is_stable_per_tenant_and_disjoint_across_tenants() {
    let (app, _state) = app_with_client(24).await;

    let first = read_json(
        app.clone()
            .oneshot(jwks_request(Some("tenant-a")))
            .await
            .expect("response"),
    )
    .await;
    let second = read_json(
        app.clone()
            .oneshot(jwks_request(Some("tenant-a")))
            .await
            .expect("response"),
    )
    .await;
    assert_eq!(first["keys"][0]["kid"], second["keys"][0]["kid"]);

    let other = read_json(
        app.oneshot(jwks_request(Some("tenant-b")))
            .await
            .expect("response"),
    )
    .await;
    assert_ne!(first["keys"][0]["kid"], other["keys"][0]["kid"]);

    // Public fields only.
    let serialized = first.to_string();
    assert!(!serialized.contains("PRIVATE"));
    assert_eq!(first["keys"][0]["kty"], "RSA");
    assert_eq!(first["keys"][0]["alg"], "RS256");
    assert_eq!(first["keys"][0]["use"], "sig");
}

#[tokio::test]
async fn tokens_do_not_verify_under_another_tenants_keys() {
    let (app, _state) = app_with_client(24).await;

    let tokens = read_json(
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/oauth/token")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(
                        "grant_type=client_credentials&client_id=client-1&client_secret=s3cret",
                    ))
                    .expect("request"),
            )
            .await
            .expect("response"),
    )
    .await;
    let access_token = tokens["access_token"].as_str().expect("access token");

    let foreign_jwks = read_json(
        app.oneshot(jwks_request(Some("tenant-b")))
            .await
            .expect("response"),
    )
    .await;

    let kid = jsonwebtoken::decode_header(access_token)
        .expect("header")
        .kid
        .expect("kid");
    let foreign_kid = foreign_jwks["keys"][0]["kid"].as_str().expect("kid");
    assert_ne!(kid, foreign_kid);

    let decoding_key = jsonwebtoken::DecodingKey::from_rsa_components(
        foreign_jwks["keys"][0]["n"].as_str().expect("n"),
        foreign_jwks["keys"][0]["e"].as_str().expect("e"),
    )
    .expect("decoding key");
    let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::RS256);
    validation.set_issuer(&[common::ISSUER]);
    validation.validate_aud = false;
    assert!(
        jsonwebtoken::decode::<serde_json::Value>(access_token, &decoding_key, &validation)
            .is_err()
    );
}

#[tokio::test]
async fn rotation_publishes_both_keys_and_old_tokens_survive() {
    let (app, state) = app_with_client(24).await;

    let tokens = read_json(
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/oauth/token")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(
                        "grant_type=client_credentials&client_id=client-1&client_secret=s3cret",
                    ))
                    .expect("request"),
            )
            .await
            .expect("response"),
    )
    .await;
    let access_token = tokens["access_token"].as_str().expect("access token");

    state
        .registry
        .rotate(&TenantId::new("tenant-a"))
        .expect("rotate");

    let jwks = read_json(
        app.oneshot(jwks_request(Some("tenant-a")))
            .await
            .expect("response"),
    )
    .await;
    assert_eq!(jwks["keys"].as_array().expect("keys").len(), 2);

    // The pre-rotation token still verifies against the published set.
    let claims = decode_with_jwks(access_token, &jwks);
    assert_eq!(claims["tenant_id"], "tenant-a");
}
