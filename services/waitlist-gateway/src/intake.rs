// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission intake pipeline.
//!
//! Order of checks, first failure wins:
//! 1. email and role present
//! 2. email syntax
//! 3. per-identity rate limit (lower-cased email)
//! 4. role in the fixed set
//! 5. ledger credentials configured
//!
//! An accepted submission is written to the ledger with one awaited call.
//! Nothing is retried.

use crate::ledger::{LedgerClient, LedgerEntry};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics::Metrics;
use crate::outcome::{OutcomeCategory, SubmissionOutcome};
use crate::validator::{SubmissionValidator, ValidationResult};
use chrono::Utc;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Raw waitlist request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl SubmissionRequest {
    /// Parse a request body. Anything that is not an object with string
    /// fields is treated as an empty submission.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|e| {
            debug!(error = %e, "Unparsable waitlist body");
            Self::default()
        })
    }
}

/// Full decision for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeDecision {
    pub outcome: SubmissionOutcome,
    /// Set when the local rate limiter rejected the attempt
    pub retry_after: Option<Duration>,
    /// Attempts left in the identity's window, once the limiter admitted it
    pub remaining: Option<u32>,
}

impl From<SubmissionOutcome> for IntakeDecision {
    fn from(outcome: SubmissionOutcome) -> Self {
        Self {
            outcome,
            retry_after: None,
            remaining: None,
        }
    }
}

impl IntakeDecision {
    fn with_remaining(mut self, remaining: u32) -> Self {
        self.remaining = Some(remaining);
        self
    }
}

/// The submission handler: validator, limiter and ledger client.
pub struct Intake {
    validator: SubmissionValidator,
    limiter: RateLimiter,
    ledger: LedgerClient,
    metrics: Metrics,
}

impl Intake {
    pub fn new(
        validator: SubmissionValidator,
        limiter: RateLimiter,
        ledger: LedgerClient,
        metrics: Metrics,
    ) -> Self {
        Self {
            validator,
            limiter,
            ledger,
            metrics,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn ledger(&self) -> &LedgerClient {
        &self.ledger
    }

    /// Run one submission through the pipeline.
    pub async fn process(&self, request: &SubmissionRequest) -> IntakeDecision {
        let decision = self.decide(request).await;
        self.metrics.record_outcome(decision.outcome);
        log_outcome(decision.outcome);
        decision
    }

    async fn decide(&self, request: &SubmissionRequest) -> IntakeDecision {
        let (email, role) = (request.email.as_deref(), request.role.as_deref());

        if let ValidationResult::Invalid(_) = self.validator.validate_presence(email, role) {
            return SubmissionOutcome::MissingFields.into();
        }
        let (Some(email), Some(role)) = (email, role) else {
            return SubmissionOutcome::MissingFields.into();
        };

        if let ValidationResult::Invalid(_) = self.validator.validate_email(email) {
            return SubmissionOutcome::InvalidEmail.into();
        }

        let identity = email.to_lowercase();
        let remaining = match self.limiter.check(&identity) {
            RateLimitResult::Allowed { remaining, reset_in } => {
                debug!(remaining, ?reset_in, "Submission within rate limit");
                remaining
            }
            RateLimitResult::Limited { retry_after } => {
                return IntakeDecision {
                    outcome: SubmissionOutcome::RateLimited,
                    retry_after: Some(retry_after),
                    remaining: Some(0),
                };
            }
        };

        self.write(email, role).await.with_remaining(remaining)
    }

    /// Role and credential checks, then the ledger write.
    async fn write(&self, email: &str, role: &str) -> IntakeDecision {
        let role = match self.validator.validate_role(role) {
            Ok(role) => role,
            Err(_) => return SubmissionOutcome::InvalidRole.into(),
        };

        if !self.ledger.is_configured() {
            error!("Ledger token or database id missing; rejecting submission");
            return SubmissionOutcome::ServerMisconfigured.into();
        }

        let entry = LedgerEntry {
            email: email.to_string(),
            role,
            submitted_on: Utc::now().date_naive(),
        };

        let started = Instant::now();
        let result = self.ledger.create_page(&entry).await;
        self.metrics
            .observe_ledger_call("create_page", result.is_ok(), started.elapsed());

        match result {
            Ok(()) => {
                info!(role = %entry.role, "Waitlist submission recorded");
                SubmissionOutcome::Accepted.into()
            }
            Err(err) => {
                let outcome = SubmissionOutcome::from_ledger_error(&err);
                warn!(error = %err, outcome = %outcome, "Ledger write failed");
                outcome.into()
            }
        }
    }
}

fn log_outcome(outcome: SubmissionOutcome) {
    match outcome.category() {
        OutcomeCategory::Accepted | OutcomeCategory::ClientInput => {
            debug!(outcome = %outcome, "Submission processed")
        }
        OutcomeCategory::Throttled => info!(outcome = %outcome, "Submission throttled"),
        OutcomeCategory::Server | OutcomeCategory::Timeout => {
            warn!(outcome = %outcome, "Submission failed")
        }
    }
}
