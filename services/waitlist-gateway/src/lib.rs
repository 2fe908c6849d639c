// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Waitlist Gateway
//!
//! Accepts waitlist sign-ups over HTTP and records them in a Notion
//! database:
//!
//! - Email and role validation
//! - Per-identity fixed-window rate limiting (3 per 15 minutes default)
//! - Ledger page creation with a bounded timeout, no retries
//! - Upstream failures mapped to sanitized client responses
//! - Health and ledger connectivity probes

pub mod config;
pub mod error;
pub mod handlers;
pub mod intake;
pub mod ledger;
pub mod limiter;
pub mod metrics;
pub mod outcome;
pub mod routes;
pub mod validator;

pub use config::Config;
pub use handlers::AppState;
pub use intake::{Intake, SubmissionRequest};
pub use limiter::{RateLimitResult, RateLimiter};
pub use outcome::SubmissionOutcome;
pub use validator::{Role, SubmissionValidator, ValidationResult};
