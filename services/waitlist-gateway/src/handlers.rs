// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the waitlist gateway.

use crate::config::Config;
use crate::intake::{Intake, SubmissionRequest};
use crate::ledger::{DatabaseInfo, LedgerClient, LedgerError};
use crate::limiter::RateLimiter;
use crate::metrics::Metrics;
use crate::outcome::SubmissionOutcome;
use crate::validator::SubmissionValidator;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Shared application state.
pub struct AppState {
    pub intake: Intake,
    pub metrics: Metrics,
    pub config: Config,
}

impl AppState {
    /// Wire up the intake pipeline from configuration.
    pub fn from_config(config: Config) -> crate::error::Result<Self> {
        let metrics = Metrics::new()?;
        let intake = Intake::new(
            SubmissionValidator::new()?,
            RateLimiter::new(config.rate_limit.clone()),
            LedgerClient::new(config.ledger.clone())?,
            metrics.clone(),
        );
        Ok(Self {
            intake,
            metrics,
            config,
        })
    }
}

/// Attempts left in the caller's current rate limit window.
pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub configured: bool,
    pub version: &'static str,
}

/// Connectivity probe response.
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

/// Liveness and configuration status.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Waitlist API is running",
        timestamp: chrono::Utc::now().to_rfc3339(),
        configured: state.config.ledger.is_configured(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Accept a waitlist sign-up.
///
/// The body is read raw so malformed JSON still yields the regular
/// `{success, message}` contract instead of an extractor rejection.
pub async fn submit(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = SubmissionRequest::from_body(&body);
    let decision = state.intake.process(&request).await;

    let mut response = decision.outcome.into_response();
    if let Some(remaining) = decision.remaining {
        response
            .headers_mut()
            .insert(RATE_LIMIT_REMAINING, HeaderValue::from(remaining));
    }
    if let Some(retry_after) = decision.retry_after {
        // round up so clients never retry inside the window
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
    }
    response
}

/// Read-only probe against the ledger's database metadata.
pub async fn test_ledger(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ProbeResponse>) {
    let ledger = state.intake.ledger();
    if !ledger.is_configured() {
        warn!("Connectivity probe requested without ledger credentials");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ProbeResponse {
                success: false,
                message: "Notion credentials are not configured",
                database: None,
                error: Some(SubmissionOutcome::ServerMisconfigured.code()),
            }),
        );
    }

    let started = Instant::now();
    let result = ledger.retrieve_database().await;
    state
        .metrics
        .observe_ledger_call("retrieve_database", result.is_ok(), started.elapsed());

    match result {
        Ok(database) => {
            info!(database_id = %database.id, "Ledger connectivity probe succeeded");
            (
                StatusCode::OK,
                Json(ProbeResponse {
                    success: true,
                    message: "Notion connection successful",
                    database: Some(database),
                    error: None,
                }),
            )
        }
        Err(err) => {
            let outcome = probe_outcome(&err);
            error!(error = %err, outcome = %outcome, "Ledger connectivity probe failed");
            (
                outcome.status(),
                Json(ProbeResponse {
                    success: false,
                    message: "Failed to connect to Notion",
                    database: None,
                    error: Some(outcome.code()),
                }),
            )
        }
    }
}

fn probe_outcome(err: &LedgerError) -> SubmissionOutcome {
    match SubmissionOutcome::from_ledger_error(err) {
        // a 400 here is never the caller's fault
        SubmissionOutcome::UpstreamRejectedFormat => SubmissionOutcome::UpstreamUnknownError,
        other => other,
    }
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    state
        .metrics
        .set_tracked_identities(state.intake.limiter().tracked_identities());

    match state.metrics.render() {
        Ok(text) => {
            debug!(bytes = text.len(), "Rendered metrics");
            (
                [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                text,
            )
                .into_response()
        }
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
