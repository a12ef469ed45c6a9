// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse patterns for security testing.
//!
//! Time is simulated: requests are spaced by `1 / requests_per_second`
//! on an injected clock, so no test sleeps.

use std::time::Duration;

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Requests per second rate
    pub requests_per_second: f64,
    /// Number of unique source ids to simulate
    pub unique_sources: usize,
    /// Whether to fill the honeypot field
    pub fill_honeypot: bool,
    /// Whether to leave required fields empty
    pub omit_fields: bool,
    /// Whether to send an oversized message
    pub oversize_message: bool,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            requests_per_second: 10.0,
            unique_sources: 1,
            fill_honeypot: false,
            omit_fields: false,
            oversize_message: false,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single source flood: basic form spam from one address.
    pub fn single_source_flood() -> Self {
        Self {
            total_requests: 200,
            requests_per_second: 50.0,
            unique_sources: 1,
            ..Default::default()
        }
    }

    /// Distributed flood: many sources, each staying low.
    pub fn distributed_flood() -> Self {
        Self {
            total_requests: 500,
            requests_per_second: 50.0,
            unique_sources: 100,
            ..Default::default()
        }
    }

    /// Form-filling bot that populates every field.
    pub fn honeypot_bot() -> Self {
        Self {
            total_requests: 50,
            requests_per_second: 10.0,
            unique_sources: 5,
            fill_honeypot: true,
            ..Default::default()
        }
    }

    /// Empty submissions.
    pub fn missing_fields_attack() -> Self {
        Self {
            total_requests: 50,
            requests_per_second: 10.0,
            unique_sources: 5,
            omit_fields: true,
            ..Default::default()
        }
    }

    /// Oversized message bodies.
    pub fn oversize_attack() -> Self {
        Self {
            total_requests: 50,
            requests_per_second: 10.0,
            unique_sources: 1,
            oversize_message: true,
            ..Default::default()
        }
    }

    /// Slow drip: one submission every 13 seconds stays under 5 per minute.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 30,
            requests_per_second: 1.0 / 13.0,
            unique_sources: 1,
            ..Default::default()
        }
    }

    /// Simulated gap between consecutive requests.
    pub fn spacing(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.requests_per_second)
    }

    /// Simulated duration of the whole attack.
    pub fn expected_duration(&self) -> Duration {
        Duration::from_secs_f64(self.total_requests as f64 / self.requests_per_second)
    }

    /// Upper bound on deliveries the rate limit should allow, given
    /// `max_per_window` admissions per `window` per source.
    pub fn max_admissions(&self, max_per_window: u32, window: Duration) -> usize {
        let elapsed = self.expected_duration().as_secs_f64();
        let windows = (elapsed / window.as_secs_f64()).ceil() as usize;
        let per_source = (windows.max(1) + 1) * max_per_window as usize;
        (per_source * self.unique_sources).min(self.total_requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_drip_spacing() {
        let config = AttackConfig::slow_drip();
        assert_eq!(config.spacing().as_secs(), 13);
    }

    #[test]
    fn test_max_admissions_capped_by_total() {
        let config = AttackConfig {
            total_requests: 3,
            ..Default::default()
        };
        assert_eq!(config.max_admissions(5, Duration::from_secs(60)), 3);
    }
}
