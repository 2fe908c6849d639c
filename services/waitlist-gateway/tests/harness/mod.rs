// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for the waitlist gateway.
//!
//! Provides a fake ledger server, data generators, and helpers for driving
//! the router in-process.

#![allow(dead_code)]

pub mod fake_ledger;
pub mod generators;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use waitlist_gateway::{
    config::{Config, LedgerConfig, RateLimitConfig},
    handlers::AppState,
    routes,
};

pub const TEST_TOKEN: &str = "secret_test_token";
pub const TEST_DATABASE: &str = "db-test-0001";

/// Config pointing at `api_base` with test credentials.
pub fn config_for(api_base: &str, timeout_ms: u64) -> Config {
    Config {
        static_dir: "tests/does-not-exist".to_string(),
        rate_limit: RateLimitConfig::default(),
        ledger: LedgerConfig {
            token: Some(TEST_TOKEN.to_string()),
            database_id: Some(TEST_DATABASE.to_string()),
            api_base: api_base.to_string(),
            timeout_ms,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Router and its state.
pub fn app(config: Config) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::from_config(config).unwrap());
    (routes::router(state.clone()), state)
}

/// Response status, headers and parsed JSON body.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub text: String,
    pub json: Value,
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let json = serde_json::from_str(&text).unwrap_or(Value::Null);
    TestResponse {
        status,
        headers,
        text,
        json,
    }
}

pub async fn post_raw(app: &Router, body: &str) -> TestResponse {
    let request = Request::builder()
        .method("POST")
        .uri("/api/waitlist")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_submission(app: &Router, email: &str, role: &str) -> TestResponse {
    let body = serde_json::json!({ "email": email, "role": role }).to_string();
    post_raw(app, &body).await
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}
