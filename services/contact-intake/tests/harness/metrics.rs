// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Metrics collection for abuse simulation results.

use contact_intake::{Outcome, RejectReason};
use std::collections::HashMap;
use std::time::Duration;

/// Collects metrics during an attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    /// Count of requests by outcome label
    outcomes: HashMap<&'static str, usize>,
    /// Count of requests by source
    requests_per_source: HashMap<String, usize>,
    /// Simulated duration of the attack
    simulated: Duration,
    /// Latency samples (microseconds)
    latencies: Vec<u64>,
}

impl AttackMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request outcome.
    pub fn record(&mut self, outcome: Outcome, source: &str, latency: Duration) {
        *self.outcomes.entry(outcome.label()).or_insert(0) += 1;
        *self.requests_per_source.entry(source.to_string()).or_insert(0) += 1;
        self.latencies.push(latency.as_micros() as u64);
    }

    /// Set the simulated attack duration.
    pub fn finish(&mut self, simulated: Duration) {
        self.simulated = simulated;
    }

    /// Get total request count.
    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Get count for a specific outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(outcome.label()).copied().unwrap_or(0)
    }

    /// Get block rate (ratio of non-delivered to total).
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        let delivered = self.count(Outcome::Delivered);
        (total - delivered) as f64 / total as f64
    }

    /// Get median latency in microseconds.
    pub fn median_latency_us(&self) -> u64 {
        if self.latencies.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();
        sorted[sorted.len() / 2]
    }

    /// Get number of unique sources that made requests.
    pub fn unique_sources(&self) -> usize {
        self.requests_per_source.len()
    }

    /// Generate a summary report.
    pub fn report(&self) -> MetricsReport {
        let rejected_input = self
            .outcomes
            .iter()
            .filter(|(label, _)| {
                !matches!(
                    **label,
                    "delivered" | "rate_limited" | "delivery_failed" | "delivery_not_configured"
                )
            })
            .map(|(_, n)| n)
            .sum();

        MetricsReport {
            total_requests: self.total_requests(),
            delivered: self.count(Outcome::Delivered),
            rate_limited: self.count(Outcome::Rejected(RejectReason::RateLimited)),
            spam_detected: self.count(Outcome::Rejected(RejectReason::SpamDetected)),
            rejected_input,
            simulated_secs: self.simulated.as_secs_f64(),
            block_rate: self.block_rate(),
            median_latency_us: self.median_latency_us(),
            unique_sources: self.unique_sources(),
        }
    }
}

/// Summary report of attack metrics.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub delivered: usize,
    pub rate_limited: usize,
    pub spam_detected: usize,
    /// Every client input rejection, spam included
    pub rejected_input: usize,
    pub simulated_secs: f64,
    pub block_rate: f64,
    pub median_latency_us: u64,
    pub unique_sources: usize,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Attack Metrics Report ===")?;
        writeln!(f, "Simulated:         {:.1} s", self.simulated_secs)?;
        writeln!(f, "Total Requests:    {}", self.total_requests)?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        writeln!(f, "Delivered:         {}", self.delivered)?;
        writeln!(f, "Rate Limited:      {}", self.rate_limited)?;
        writeln!(f, "Spam Detected:     {}", self.spam_detected)?;
        writeln!(f, "Input Rejected:    {}", self.rejected_input)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f)?;
        writeln!(f, "Median latency:    {} us", self.median_latency_us)?;
        writeln!(f, "Unique Sources:    {}", self.unique_sources)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_rate() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Delivered, "10.0.0.1", Duration::ZERO);
        }
        for _ in 0..7 {
            metrics.record(
                Outcome::Rejected(RejectReason::RateLimited),
                "10.0.0.1",
                Duration::ZERO,
            );
        }

        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
        assert_eq!(metrics.report().rejected_input, 0);
    }
}
