// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding window rate limiter for contact submissions.
//!
//! Each source keeps the timestamps of its admitted submissions. Before a
//! capacity check the window is pruned to entries younger than the window
//! length; a source at capacity is refused without recording the attempt.
//!
//! Idle sources are dropped by [`RateLimiter::cleanup`], and the number of
//! tracked sources is bounded by `max_sources`.

use crate::config::RateLimitConfig;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Submission is admitted and has been recorded
    Allowed {
        /// Remaining admissions in the current window
        remaining: u32,
        /// Time until the oldest recorded admission leaves the window
        reset_in: Duration,
    },
    /// Source is at capacity
    Limited {
        /// Time until the oldest recorded admission leaves the window
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Admission history for one source.
#[derive(Debug, Default)]
struct SourceWindow {
    /// Admitted submission times, oldest first
    admitted: VecDeque<DateTime<Utc>>,
    /// Last attempt, admitted or not
    last_seen: Option<DateTime<Utc>>,
}

impl SourceWindow {
    /// Drop timestamps that are no longer within `window` of `now`.
    fn prune(&mut self, now: DateTime<Utc>, window: chrono::Duration) {
        while let Some(oldest) = self.admitted.front() {
            if now.signed_duration_since(*oldest) < window {
                break;
            }
            self.admitted.pop_front();
        }
    }

    /// Time until the oldest admission ages out.
    fn time_until_slot(&self, now: DateTime<Utc>, window: chrono::Duration) -> Duration {
        self.admitted
            .front()
            .and_then(|oldest| oldest.checked_add_signed(window))
            .and_then(|slot| slot.signed_duration_since(now).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }

    fn is_idle(&self, now: DateTime<Utc>, idle_ttl: chrono::Duration) -> bool {
        match self.last_seen {
            Some(seen) => now.signed_duration_since(seen) >= idle_ttl,
            None => true,
        }
    }
}

/// Thread-safe per-source rate limiter.
///
/// Cloning is cheap and shares the ledger.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    ledger: Arc<RwLock<HashMap<String, SourceWindow>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    ///
    /// Out of range window and idle TTL values are clamped.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config: config.clamped(),
            ledger: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn window(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.config.window_ms as i64)
    }

    fn idle_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.config.idle_ttl_secs as i64)
    }

    /// Check and record a submission attempt from `source` at `now`.
    ///
    /// The prune, the capacity check and the append happen under one write
    /// guard, so concurrent attempts from the same source are serialized.
    pub async fn check(&self, source: &str, now: DateTime<Utc>) -> RateLimitResult {
        let window = self.window();
        let max = self.config.max_per_window as usize;

        let mut ledger = self.ledger.write().await;

        if !ledger.contains_key(source) && ledger.len() >= self.config.max_sources {
            self.make_room(&mut ledger, now);
        }

        let entry = ledger.entry(source.to_string()).or_default();
        entry.prune(now, window);
        entry.last_seen = Some(now);

        if entry.admitted.len() >= max {
            let retry_after = entry.time_until_slot(now, window);
            debug!(
                source,
                count = entry.admitted.len(),
                ?retry_after,
                "Source rate limit exceeded"
            );
            return RateLimitResult::Limited { retry_after };
        }

        entry.admitted.push_back(now);
        RateLimitResult::Allowed {
            remaining: (max - entry.admitted.len()) as u32,
            reset_in: entry.time_until_slot(now, window),
        }
    }

    /// Number of admissions currently recorded for `source` within the window.
    pub async fn recorded(&self, source: &str, now: DateTime<Utc>) -> usize {
        let window = self.window();
        let ledger = self.ledger.read().await;
        ledger
            .get(source)
            .map(|entry| {
                entry
                    .admitted
                    .iter()
                    .filter(|t| now.signed_duration_since(**t) < window)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Number of sources currently tracked.
    pub async fn tracked_sources(&self) -> usize {
        self.ledger.read().await.len()
    }

    /// Drop sources with an empty window or no activity within the idle TTL.
    ///
    /// Returns the number of sources removed.
    pub async fn cleanup(&self, now: DateTime<Utc>) -> usize {
        let mut ledger = self.ledger.write().await;
        let removed = sweep(&mut ledger, now, self.window(), self.idle_ttl());
        if removed > 0 {
            debug!(removed, remaining = ledger.len(), "Rate limit ledger cleaned up");
        }
        removed
    }

    /// Free one slot for a new source: sweep stale entries, then evict the
    /// least recently seen source if the ledger is still full.
    fn make_room(&self, ledger: &mut HashMap<String, SourceWindow>, now: DateTime<Utc>) {
        sweep(ledger, now, self.window(), self.idle_ttl());

        while ledger.len() >= self.config.max_sources.max(1) {
            let victim = ledger
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(key, _)| key.clone());
            match victim {
                Some(key) => {
                    warn!(
                        source = %key,
                        "Rate limit ledger full, evicting least recently seen source"
                    );
                    ledger.remove(&key);
                }
                None => break,
            }
        }
    }
}

fn sweep(
    ledger: &mut HashMap<String, SourceWindow>,
    now: DateTime<Utc>,
    window: chrono::Duration,
    idle_ttl: chrono::Duration,
) -> usize {
    let before = ledger.len();
    ledger.retain(|_, entry| {
        entry.prune(now, window);
        !entry.admitted.is_empty() && !entry.is_idle(now, idle_ttl)
    });
    before - ledger.len()
}
