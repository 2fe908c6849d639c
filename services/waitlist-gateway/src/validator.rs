// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Waitlist submission validator.
//!
//! Checks the shape of a submission:
//! - Email and role presence
//! - Email syntax (local@domain.tld, no whitespace, single `@`)
//! - Role membership in the fixed set
//!
//! The checks are exposed separately because the rate limiter runs between
//! the email and role checks.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Syntactic email pattern: no whitespace, exactly one `@`, a dot after it.
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Unknown role: {0}")]
    InvalidRole(String),
}

/// Result of validation.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Input is valid
    Valid,
    /// Input is invalid
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        }
    }
}

/// Roles a waitlist member can sign up as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Student / Learner")]
    Student,
    #[serde(rename = "Tutor / Teacher")]
    Tutor,
    #[serde(rename = "School / Institute")]
    School,
    #[serde(rename = "Developer / Researcher")]
    Developer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Student, Role::Tutor, Role::School, Role::Developer];

    /// Label as shown to users and stored in the ledger's select field.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Student => "Student / Learner",
            Role::Tutor => "Tutor / Teacher",
            Role::School => "School / Institute",
            Role::Developer => "Developer / Researcher",
        }
    }

    /// Exact, case-sensitive match against the known labels.
    pub fn from_label(label: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.label() == label)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Submission shape validator.
pub struct SubmissionValidator {
    email_pattern: Regex,
}

impl SubmissionValidator {
    /// Create a validator with the standard email pattern.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            email_pattern: Regex::new(EMAIL_PATTERN)?,
        })
    }

    /// Both fields present and non-empty. Values are not trimmed.
    pub fn validate_presence(&self, email: Option<&str>, role: Option<&str>) -> ValidationResult {
        if !is_present(email) {
            debug!("Missing email field");
            return ValidationResult::Invalid(ValidationError::MissingField("email"));
        }
        if !is_present(role) {
            debug!("Missing role field");
            return ValidationResult::Invalid(ValidationError::MissingField("role"));
        }
        ValidationResult::Valid
    }

    /// Email matches the syntactic pattern.
    pub fn validate_email(&self, email: &str) -> ValidationResult {
        if self.email_pattern.is_match(email) {
            ValidationResult::Valid
        } else {
            debug!("Email failed syntax check");
            ValidationResult::Invalid(ValidationError::InvalidEmail)
        }
    }

    /// Role is one of the fixed labels.
    pub fn validate_role(&self, role: &str) -> Result<Role, ValidationError> {
        Role::from_label(role).ok_or_else(|| {
            debug!(role = %role, "Unknown role");
            ValidationError::InvalidRole(role.to_string())
        })
    }
}

fn is_present(value: Option<&str>) -> bool {
    matches!(value, Some(v) if !v.is_empty())
}
