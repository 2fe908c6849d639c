// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the waitlist gateway.

use crate::outcome::SubmissionOutcome;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric handles, registered on a private registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
    ledger_latency: HistogramVec,
    tracked_identities: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("waitlist".to_string()), None)?;

        let submissions = IntCounterVec::new(
            Opts::new("submissions_total", "Waitlist submissions by outcome"),
            &["outcome"],
        )?;
        let ledger_latency = HistogramVec::new(
            HistogramOpts::new(
                "ledger_request_duration_seconds",
                "Latency of ledger API calls",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["operation", "result"],
        )?;
        let tracked_identities = IntGauge::new(
            "rate_limit_tracked_identities",
            "Identities currently held by the rate limiter",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(ledger_latency.clone()))?;
        registry.register(Box::new(tracked_identities.clone()))?;

        Ok(Self {
            registry,
            submissions,
            ledger_latency,
            tracked_identities,
        })
    }

    pub fn record_outcome(&self, outcome: SubmissionOutcome) {
        self.submissions.with_label_values(&[outcome.code()]).inc();
    }

    pub fn observe_ledger_call(&self, operation: &str, ok: bool, elapsed: Duration) {
        let result = if ok { "ok" } else { "error" };
        self.ledger_latency
            .with_label_values(&[operation, result])
            .observe(elapsed.as_secs_f64());
    }

    pub fn set_tracked_identities(&self, count: usize) {
        self.tracked_identities
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn submissions_with_outcome(&self, outcome: SubmissionOutcome) -> u64 {
        self.submissions.with_label_values(&[outcome.code()]).get()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
