// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! CORS behaviour for wildcard and explicit origin lists

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use leaf_scan_node::{api::create_app, config::CorsPolicy};
use std::time::Duration;
use tower::util::ServiceExt;

use super::support::{state_with, StubDetector};

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri("/predict")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_wildcard_allows_any_origin_without_credentials() {
    let app = create_app(state_with(
        StubDetector::returning(vec![]),
        Duration::from_secs(5),
        CorsPolicy::Any,
    ));

    let response = app.oneshot(preflight("https://farm.example")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(headers
        .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
        .is_none());
}

#[tokio::test]
async fn test_origin_list_echoes_allowed_origin() {
    let policy = CorsPolicy::parse("http://localhost:5173,https://farm.example").unwrap();
    let app = create_app(state_with(
        StubDetector::returning(vec![]),
        Duration::from_secs(5),
        policy,
    ));

    let response = app.oneshot(preflight("https://farm.example")).await.unwrap();
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://farm.example"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn test_origin_list_ignores_unknown_origin() {
    let policy = CorsPolicy::parse("https://farm.example").unwrap();
    let app = create_app(state_with(
        StubDetector::returning(vec![]),
        Duration::from_secs(5),
        policy,
    ));

    let response = app.oneshot(preflight("https://evil.example")).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
