// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the waitlist gateway.
//!
//! Every value has a default so the service starts with nothing but the two
//! ledger credentials set. Missing credentials do not stop startup; they are
//! reported by `/api/health` and rejected per request.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the waitlist gateway service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:3000)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory served for every path not handled by the API
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Ledger (Notion) configuration
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Fixed-window rate limiting per submitting identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitConfig {
    /// Length of the rate-limit window in milliseconds (default: 15 minutes)
    #[serde(default = "default_window_duration_ms")]
    pub window_duration_ms: u64,

    /// Submissions allowed per identity in one window (default: 3)
    #[serde(default = "default_max_submissions")]
    pub max_submissions_per_identity: u32,

    /// How often expired entries are evicted, in seconds (default: 60)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

/// Connection settings for the ledger service.
#[derive(Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Bearer token for the integration
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Database that receives one page per submission
    #[serde(default)]
    pub database_id: Option<String>,

    /// API base URL (default: https://api.notion.com)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Value of the `Notion-Version` header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Upper bound for a single upstream call in milliseconds (default: 10000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_window_duration_ms() -> u64 {
    15 * 60 * 1000
}

fn default_max_submissions() -> u32 {
    3
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

fn default_api_base() -> String {
    "https://api.notion.com".to_string()
}

fn default_api_version() -> String {
    "2022-06-28".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            static_dir: default_static_dir(),
            rate_limit: RateLimitConfig::default(),
            ledger: LedgerConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_duration_ms: default_window_duration_ms(),
            max_submissions_per_identity: default_max_submissions(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            token: None,
            database_id: None,
            api_base: default_api_base(),
            api_version: default_api_version(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl std::fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("database_id", &self.database_id)
            .field("api_base", &self.api_base)
            .field("api_version", &self.api_version)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl RateLimitConfig {
    /// Get the window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_duration_ms)
    }

    /// Get the eviction interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

impl LedgerConfig {
    /// Get the upstream timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Token and database id, when both are set and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.token.as_deref().filter(|t| !t.trim().is_empty())?;
        let database_id = self.database_id.as_deref().filter(|d| !d.trim().is_empty())?;
        Some((token, database_id))
    }

    /// Whether both credentials are present.
    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }
}

impl Config {
    /// Load configuration from process environment variables.
    ///
    /// Unset variables fall back to defaults; set but unparsable numeric or
    /// boolean values are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let config = Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            static_dir: lookup("STATIC_DIR").unwrap_or(defaults.static_dir),
            rate_limit: RateLimitConfig {
                window_duration_ms: parse_var(&lookup, "RATE_LIMIT_WINDOW_MS")?
                    .unwrap_or(defaults.rate_limit.window_duration_ms),
                max_submissions_per_identity: parse_var(&lookup, "RATE_LIMIT_MAX_SUBMISSIONS")?
                    .unwrap_or(defaults.rate_limit.max_submissions_per_identity),
                cleanup_interval_secs: parse_var(&lookup, "RATE_LIMIT_CLEANUP_SECS")?
                    .unwrap_or(defaults.rate_limit.cleanup_interval_secs),
            },
            ledger: LedgerConfig {
                token: lookup("NOTION_TOKEN"),
                database_id: lookup("NOTION_DATABASE_ID"),
                api_base: lookup("NOTION_API_URL").unwrap_or(defaults.ledger.api_base),
                api_version: lookup("NOTION_VERSION").unwrap_or(defaults.ledger.api_version),
                timeout_ms: parse_var(&lookup, "LEDGER_TIMEOUT_MS")?
                    .unwrap_or(defaults.ledger.timeout_ms),
            },
            metrics: MetricsConfig {
                enabled: parse_var(&lookup, "METRICS_ENABLED")?
                    .unwrap_or(defaults.metrics.enabled),
                ..defaults.metrics
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.max_submissions_per_identity == 0 {
            return Err(ConfigError::Invalid {
                key: "RATE_LIMIT_MAX_SUBMISSIONS",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.rate_limit.window_duration_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "RATE_LIMIT_WINDOW_MS",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.ledger.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "LEDGER_TIMEOUT_MS",
                reason: "must be greater than zero".to_string(),
            });
        }
        url::Url::parse(&self.ledger.api_base).map_err(|e| ConfigError::Invalid {
            key: "NOTION_API_URL",
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: format!("{raw:?}: {e}"),
            }),
    }
}
