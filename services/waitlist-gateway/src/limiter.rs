// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter keyed by submitting identity.
//!
//! Each identity gets a counter and the instant its window opened. A window
//! is never slid: once it has been open longer than the configured duration
//! the next attempt starts a fresh one. Attempts rejected while the window is
//! full are not counted.
//!
//! The limiter does no key normalization; callers lower-case emails first.

use crate::config::RateLimitConfig;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Attempt recorded and allowed
    Allowed {
        /// Attempts left in the current window
        remaining: u32,
        /// Time until the current window closes
        reset_in: Duration,
    },
    /// Window is full for this identity
    Limited {
        /// Time until the current window closes
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Counter state for a single identity.
#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    window_start: Instant,
}

impl WindowEntry {
    fn open(now: Instant) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }

    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.duration_since(self.window_start) > window
    }

    fn time_left(&self, now: Instant, window: Duration) -> Duration {
        window.saturating_sub(now.duration_since(self.window_start))
    }
}

/// Thread-safe fixed-window rate limiter.
///
/// The read-check-increment sequence for one identity runs while holding
/// that identity's map entry, so concurrent attempts for the same identity
/// are serialized and can never push `count` past the maximum.
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: DashMap<String, WindowEntry>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
        }
    }

    /// Record an attempt for `identity` and report whether it is allowed.
    pub fn check(&self, identity: &str) -> RateLimitResult {
        let now = Instant::now();
        let window = self.config.window_duration();
        let max = self.config.max_submissions_per_identity;

        let mut entry = self
            .entries
            .entry(identity.to_string())
            .or_insert_with(|| WindowEntry {
                count: 0,
                window_start: now,
            });

        if entry.count == 0 || entry.is_expired(now, window) {
            *entry = WindowEntry::open(now);
            return RateLimitResult::Allowed {
                remaining: max.saturating_sub(1),
                reset_in: window,
            };
        }

        if entry.count >= max {
            let retry_after = entry.time_left(now, window);
            debug!(identity = %identity, count = entry.count, ?retry_after, "Identity rate limit exceeded");
            return RateLimitResult::Limited { retry_after };
        }

        entry.count += 1;
        RateLimitResult::Allowed {
            remaining: max.saturating_sub(entry.count),
            reset_in: entry.time_left(now, window),
        }
    }

    /// Record an attempt for `identity`; `true` when it must be rejected.
    pub fn is_rate_limited(&self, identity: &str) -> bool {
        !self.check(identity).is_allowed()
    }

    /// Drop entries whose window has expired.
    ///
    /// An expired entry would be reset on its next use anyway, so eviction
    /// never changes what `check` returns. Returns the number removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let window = self.config.window_duration();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now, window));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "Evicted expired rate limit entries");
        }
        removed
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.entries.len()
    }
}
