// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client for the ledger service (Notion database API).
//!
//! Two calls are used: page creation for accepted submissions and a
//! database metadata read for the connectivity probe. The request and
//! response shapes follow the Notion public API and must not change.

use crate::config::LedgerConfig;
use crate::validator::Role;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Property names in the target database.
pub const TITLE_PROPERTY: &str = "Name";
pub const EMAIL_PROPERTY: &str = "Email";
pub const ROLE_PROPERTY: &str = "Role";
pub const DATE_PROPERTY: &str = "Date";

/// Ledger call failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The service answered with a non-success status.
    #[error("Ledger API returned {status}: {}", .message.as_deref().unwrap_or("no detail"))]
    Api {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },

    #[error("Ledger request timed out")]
    Timeout,

    /// No response was received.
    #[error("Ledger unreachable: {0}")]
    Network(String),

    #[error("Unexpected ledger response: {0}")]
    Decode(String),

    #[error("Ledger credentials are not configured")]
    NotConfigured,
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LedgerError::Timeout
        } else if err.is_decode() {
            LedgerError::Decode(err.to_string())
        } else {
            LedgerError::Network(err.to_string())
        }
    }
}

/// One accepted waitlist submission, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub email: String,
    pub role: Role,
    pub submitted_on: NaiveDate,
}

impl LedgerEntry {
    /// Page-creation body for the given database.
    pub fn to_page_body(&self, database_id: &str) -> Value {
        json!({
            "parent": { "database_id": database_id },
            "properties": {
                TITLE_PROPERTY: {
                    "title": [ { "text": { "content": self.email } } ]
                },
                EMAIL_PROPERTY: { "email": self.email },
                ROLE_PROPERTY: { "select": { "name": self.role.label() } },
                DATE_PROPERTY: {
                    "date": { "start": self.submitted_on.format("%Y-%m-%d").to_string() }
                }
            }
        })
    }
}

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RichText {
    #[serde(default)]
    plain_text: String,
}

#[derive(Debug, Deserialize)]
struct DatabaseObject {
    id: String,
    #[serde(default)]
    title: Vec<RichText>,
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
}

/// Summary of the target database, as reported by the probe.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub id: String,
    pub title: String,
    pub properties: Vec<String>,
}

impl From<DatabaseObject> for DatabaseInfo {
    fn from(db: DatabaseObject) -> Self {
        let title = db
            .title
            .into_iter()
            .map(|t| t.plain_text)
            .collect::<Vec<_>>()
            .join("");
        let mut properties: Vec<String> = db.properties.into_iter().map(|(k, _)| k).collect();
        properties.sort();
        Self {
            id: db.id,
            title,
            properties,
        }
    }
}

/// Ledger API client.
pub struct LedgerClient {
    config: LedgerConfig,
    base: Url,
    client: reqwest::Client,
}

impl LedgerClient {
    /// Create a client; every request is bounded by the configured timeout.
    pub fn new(config: LedgerConfig) -> Result<Self, crate::error::AppError> {
        let base = Url::parse(&config.api_base).map_err(|e| {
            crate::error::ConfigError::Invalid {
                key: "NOTION_API_URL",
                reason: e.to_string(),
            }
        })?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            config,
            base,
            client,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Create one page in the target database.
    pub async fn create_page(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        let (token, database_id) = self.config.credentials().ok_or(LedgerError::NotConfigured)?;
        let url = self.endpoint("v1/pages")?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .header("Notion-Version", &self.config.api_version)
            .json(&entry.to_page_body(database_id))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Ledger page created");
            Ok(())
        } else {
            Err(api_error(status, response).await)
        }
    }

    /// Read the target database's metadata.
    pub async fn retrieve_database(&self) -> Result<DatabaseInfo, LedgerError> {
        let (token, database_id) = self.config.credentials().ok_or(LedgerError::NotConfigured)?;
        let url = self.endpoint(&format!("v1/databases/{database_id}"))?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header("Notion-Version", &self.config.api_version)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }

        let db: DatabaseObject = response.json().await?;
        Ok(db.into())
    }

    fn endpoint(&self, path: &str) -> Result<Url, LedgerError> {
        let mut base = self.base.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path)
            .map_err(|e| LedgerError::Decode(format!("invalid endpoint {path}: {e}")))
    }
}

async fn api_error(status: StatusCode, response: reqwest::Response) -> LedgerError {
    let body = response.text().await.unwrap_or_default();
    let parsed: Option<ApiErrorBody> = serde_json::from_str(&body).ok();
    let (code, message) = match parsed {
        Some(b) => (b.code, b.message),
        None => (None, None),
    };
    LedgerError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}
