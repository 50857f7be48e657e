//! Shared helpers for router-level tests.
//!
//! Each test builds the full router over a fresh in-memory store and sends
//! requests through `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use notekeeper_api::{create_router, AppState};
use notekeeper_core::Identity;
use notekeeper_db::test_fixtures::{fast_hasher, test_codec, TEST_PASSWORD};
use notekeeper_db::MemoryStore;

pub fn router() -> Router {
    router_with_docs(true)
}

pub fn router_with_docs(docs_enabled: bool) -> Router {
    let store = MemoryStore::new();
    let state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(store),
        Arc::new(fast_hasher()),
        test_codec(),
        docs_enabled,
    );
    create_router(state)
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(val) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(val.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, body)
}

/// Register `email` and log in, returning the bearer token.
pub async fn register_and_login(router: &Router, email: &str) -> String {
    let creds = json!({ "email": email, "password": TEST_PASSWORD });

    let (status, _) = send(
        router,
        request(Method::POST, "/api/users/register", None, Some(creds.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        router,
        request(Method::POST, "/api/users/login", None, Some(creds)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

/// Token signed with the router's key but issued at `issued_at`.
pub fn token_issued_at(email: &str, issued_at: DateTime<Utc>) -> String {
    let identity = Identity::parse_email(email).unwrap();
    test_codec().issue(&identity, issued_at).unwrap()
}
