// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client-facing outcomes of a waitlist submission.
//!
//! Every path through the intake pipeline ends in exactly one
//! [`SubmissionOutcome`]. Each outcome owns its HTTP status and a fixed,
//! sanitized message; upstream detail is never part of the response.

use crate::ledger::LedgerError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Result of processing one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionOutcome {
    Accepted,
    MissingFields,
    InvalidEmail,
    RateLimited,
    InvalidRole,
    ServerMisconfigured,
    UpstreamRejectedFormat,
    UpstreamAuthError,
    UpstreamTargetMissing,
    UpstreamBusy,
    UpstreamUnknownError,
    UpstreamTimeout,
    NetworkError,
}

/// Broad class of an outcome, used for log levels and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeCategory {
    Accepted,
    /// Fixable by correcting the request
    ClientInput,
    /// Transient, retry later
    Throttled,
    /// Operator problem
    Server,
    Timeout,
}

/// Response body for `POST /api/waitlist`.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: &'static str,
}

impl SubmissionOutcome {
    pub const ALL: [SubmissionOutcome; 13] = [
        SubmissionOutcome::Accepted,
        SubmissionOutcome::MissingFields,
        SubmissionOutcome::InvalidEmail,
        SubmissionOutcome::RateLimited,
        SubmissionOutcome::InvalidRole,
        SubmissionOutcome::ServerMisconfigured,
        SubmissionOutcome::UpstreamRejectedFormat,
        SubmissionOutcome::UpstreamAuthError,
        SubmissionOutcome::UpstreamTargetMissing,
        SubmissionOutcome::UpstreamBusy,
        SubmissionOutcome::UpstreamUnknownError,
        SubmissionOutcome::UpstreamTimeout,
        SubmissionOutcome::NetworkError,
    ];

    /// Map an upstream status code to an outcome.
    pub fn from_upstream_status(status: u16) -> Self {
        match status {
            400 => SubmissionOutcome::UpstreamRejectedFormat,
            401 => SubmissionOutcome::UpstreamAuthError,
            404 => SubmissionOutcome::UpstreamTargetMissing,
            429 => SubmissionOutcome::UpstreamBusy,
            _ => SubmissionOutcome::UpstreamUnknownError,
        }
    }

    /// Map a failed ledger call to an outcome.
    pub fn from_ledger_error(err: &LedgerError) -> Self {
        match err {
            LedgerError::Api { status, .. } => Self::from_upstream_status(*status),
            LedgerError::Timeout => SubmissionOutcome::UpstreamTimeout,
            LedgerError::Network(_) => SubmissionOutcome::NetworkError,
            LedgerError::Decode(_) => SubmissionOutcome::UpstreamUnknownError,
            LedgerError::NotConfigured => SubmissionOutcome::ServerMisconfigured,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SubmissionOutcome::Accepted => StatusCode::OK,
            SubmissionOutcome::MissingFields
            | SubmissionOutcome::InvalidEmail
            | SubmissionOutcome::InvalidRole
            | SubmissionOutcome::UpstreamRejectedFormat => StatusCode::BAD_REQUEST,
            SubmissionOutcome::RateLimited | SubmissionOutcome::UpstreamBusy => {
                StatusCode::TOO_MANY_REQUESTS
            }
            SubmissionOutcome::UpstreamTimeout => StatusCode::REQUEST_TIMEOUT,
            SubmissionOutcome::ServerMisconfigured
            | SubmissionOutcome::UpstreamAuthError
            | SubmissionOutcome::UpstreamTargetMissing
            | SubmissionOutcome::UpstreamUnknownError
            | SubmissionOutcome::NetworkError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SubmissionOutcome::Accepted => "Successfully added to the waitlist!",
            SubmissionOutcome::MissingFields => "Email and role are required",
            SubmissionOutcome::InvalidEmail => "Please enter a valid email address",
            SubmissionOutcome::RateLimited => {
                "Too many submissions. Please try again in a few minutes."
            }
            SubmissionOutcome::InvalidRole => "Please select a valid role",
            SubmissionOutcome::ServerMisconfigured => {
                "Server configuration error. Please contact support."
            }
            SubmissionOutcome::UpstreamRejectedFormat => "Invalid data format. Please try again.",
            SubmissionOutcome::UpstreamAuthError | SubmissionOutcome::UpstreamTargetMissing => {
                "Server error. Please contact support."
            }
            SubmissionOutcome::UpstreamBusy => "Server is busy. Please try again in a moment.",
            SubmissionOutcome::UpstreamUnknownError => {
                "Something went wrong. Please try again later."
            }
            SubmissionOutcome::UpstreamTimeout => "Request timed out. Please try again.",
            SubmissionOutcome::NetworkError => {
                "Network error. Please check your connection and try again."
            }
        }
    }

    /// Stable machine-readable code, used in logs, metrics and the probe.
    pub fn code(&self) -> &'static str {
        match self {
            SubmissionOutcome::Accepted => "ACCEPTED",
            SubmissionOutcome::MissingFields => "MISSING_FIELDS",
            SubmissionOutcome::InvalidEmail => "INVALID_EMAIL",
            SubmissionOutcome::RateLimited => "RATE_LIMITED",
            SubmissionOutcome::InvalidRole => "INVALID_ROLE",
            SubmissionOutcome::ServerMisconfigured => "SERVER_MISCONFIGURED",
            SubmissionOutcome::UpstreamRejectedFormat => "UPSTREAM_REJECTED_FORMAT",
            SubmissionOutcome::UpstreamAuthError => "UPSTREAM_AUTH_ERROR",
            SubmissionOutcome::UpstreamTargetMissing => "UPSTREAM_TARGET_MISSING",
            SubmissionOutcome::UpstreamBusy => "UPSTREAM_BUSY",
            SubmissionOutcome::UpstreamUnknownError => "UPSTREAM_UNKNOWN_ERROR",
            SubmissionOutcome::UpstreamTimeout => "UPSTREAM_TIMEOUT",
            SubmissionOutcome::NetworkError => "NETWORK_ERROR",
        }
    }

    pub fn category(&self) -> OutcomeCategory {
        match self {
            SubmissionOutcome::Accepted => OutcomeCategory::Accepted,
            SubmissionOutcome::MissingFields
            | SubmissionOutcome::InvalidEmail
            | SubmissionOutcome::InvalidRole => OutcomeCategory::ClientInput,
            SubmissionOutcome::RateLimited | SubmissionOutcome::UpstreamBusy => {
                OutcomeCategory::Throttled
            }
            SubmissionOutcome::UpstreamTimeout => OutcomeCategory::Timeout,
            SubmissionOutcome::ServerMisconfigured
            | SubmissionOutcome::UpstreamRejectedFormat
            | SubmissionOutcome::UpstreamAuthError
            | SubmissionOutcome::UpstreamTargetMissing
            | SubmissionOutcome::UpstreamUnknownError
            | SubmissionOutcome::NetworkError => OutcomeCategory::Server,
        }
    }

    pub fn body(&self) -> SubmissionResponse {
        SubmissionResponse {
            success: self.is_accepted(),
            message: self.message(),
        }
    }
}

impl std::fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl IntoResponse for SubmissionOutcome {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_mapping() {
        use SubmissionOutcome::*;

        let cases = [
            (400, UpstreamRejectedFormat, StatusCode::BAD_REQUEST),
            (401, UpstreamAuthError, StatusCode::INTERNAL_SERVER_ERROR),
            (404, UpstreamTargetMissing, StatusCode::INTERNAL_SERVER_ERROR),
            (429, UpstreamBusy, StatusCode::TOO_MANY_REQUESTS),
            (403, UpstreamUnknownError, StatusCode::INTERNAL_SERVER_ERROR),
            (409, UpstreamUnknownError, StatusCode::INTERNAL_SERVER_ERROR),
            (500, UpstreamUnknownError, StatusCode::INTERNAL_SERVER_ERROR),
            (503, UpstreamUnknownError, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (status, outcome, http) in cases {
            let mapped = SubmissionOutcome::from_upstream_status(status);
            assert_eq!(mapped, outcome, "upstream {status}");
            assert_eq!(mapped.status(), http, "upstream {status}");
        }
    }

    #[test]
    fn test_transport_errors() {
        assert_eq!(
            SubmissionOutcome::from_ledger_error(&LedgerError::Timeout),
            SubmissionOutcome::UpstreamTimeout
        );
        assert_eq!(
            SubmissionOutcome::UpstreamTimeout.status(),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            SubmissionOutcome::from_ledger_error(&LedgerError::Network("refused".into())),
            SubmissionOutcome::NetworkError
        );
        assert_eq!(
            SubmissionOutcome::from_ledger_error(&LedgerError::Api {
                status: 401,
                code: Some("unauthorized".into()),
                message: Some("API token is invalid.".into()),
            }),
            SubmissionOutcome::UpstreamAuthError
        );
    }

    #[test]
    fn test_only_accepted_is_success() {
        for outcome in SubmissionOutcome::ALL {
            let body = outcome.body();
            assert_eq!(body.success, outcome == SubmissionOutcome::Accepted);
            assert_eq!(outcome.status().is_success(), body.success, "{outcome}");
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            SubmissionOutcome::InvalidRole.category(),
            OutcomeCategory::ClientInput
        );
        assert_eq!(
            SubmissionOutcome::UpstreamBusy.category(),
            OutcomeCategory::Throttled
        );
        assert_eq!(
            SubmissionOutcome::NetworkError.category(),
            OutcomeCategory::Server
        );
    }

    #[test]
    fn test_busy_message_tone() {
        assert!(SubmissionOutcome::UpstreamBusy
            .message()
            .starts_with("Server is busy"));
    }
}
