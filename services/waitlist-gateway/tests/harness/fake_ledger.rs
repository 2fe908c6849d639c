// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-process stand-in for the Notion API.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Upstream detail that must never reach a waitlist client.
pub const UPSTREAM_DETAIL: &str = "body.properties.Role.select.name should be populated";

/// How the fake answers every call.
#[derive(Debug, Clone, Copy)]
pub enum LedgerBehavior {
    Succeed,
    /// Structured error with this status
    Fail(u16),
    /// Succeed after sleeping
    Hang(Duration),
}

/// One request the fake received.
#[derive(Debug, Clone)]
pub struct ReceivedCall {
    pub path: String,
    pub authorization: Option<String>,
    pub notion_version: Option<String>,
    pub body: Option<Value>,
}

struct Shared {
    behavior: LedgerBehavior,
    calls: Mutex<Vec<ReceivedCall>>,
}

/// A running fake ledger bound to a random local port.
pub struct FakeLedger {
    pub base_url: String,
    shared: Arc<Shared>,
    handle: JoinHandle<()>,
}

impl FakeLedger {
    pub async fn start(behavior: LedgerBehavior) -> Self {
        let shared = Arc::new(Shared {
            behavior,
            calls: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/pages", post(create_page))
            .route("/v1/databases/:id", get(retrieve_database))
            .with_state(shared.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            shared,
            handle,
        }
    }

    pub fn calls(&self) -> Vec<ReceivedCall> {
        self.shared.calls.lock().unwrap().clone()
    }
}

impl Drop for FakeLedger {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Base URL of a port with nothing listening on it.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn respond(behavior: LedgerBehavior, success: Value) -> Response {
    match behavior {
        LedgerBehavior::Succeed => (StatusCode::OK, Json(success)).into_response(),
        LedgerBehavior::Hang(delay) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, Json(success)).into_response()
        }
        LedgerBehavior::Fail(status) => {
            let code = StatusCode::from_u16(status).unwrap();
            (
                code,
                Json(json!({
                    "object": "error",
                    "status": status,
                    "code": "validation_error",
                    "message": UPSTREAM_DETAIL,
                })),
            )
                .into_response()
        }
    }
}

async fn create_page(
    State(shared): State<Arc<Shared>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    shared.calls.lock().unwrap().push(ReceivedCall {
        path: "/v1/pages".to_string(),
        authorization: header(&headers, "authorization"),
        notion_version: header(&headers, "notion-version"),
        body: Some(body),
    });

    respond(
        shared.behavior,
        json!({ "object": "page", "id": "page-0001" }),
    )
    .await
}

async fn retrieve_database(
    State(shared): State<Arc<Shared>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    shared.calls.lock().unwrap().push(ReceivedCall {
        path: format!("/v1/databases/{id}"),
        authorization: header(&headers, "authorization"),
        notion_version: header(&headers, "notion-version"),
        body: None,
    });

    respond(
        shared.behavior,
        json!({
            "object": "database",
            "id": id,
            "title": [ { "type": "text", "plain_text": "Waitlist" } ],
            "properties": {
                "Name": { "type": "title" },
                "Email": { "type": "email" },
                "Role": { "type": "select" },
                "Date": { "type": "date" }
            }
        }),
    )
    .await
}
