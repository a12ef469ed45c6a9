// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the intake pipeline.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Intake counters, kept in a private registry.
#[derive(Clone)]
pub struct IntakeMetrics {
    registry: Registry,
    submissions: IntCounterVec,
    delivery_duration: Histogram,
    tracked_sources: IntGauge,
}

impl IntakeMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new(
                "contact_submissions_total",
                "Contact submissions by outcome",
            ),
            &["outcome"],
        )?;
        let delivery_duration = Histogram::with_opts(
            HistogramOpts::new(
                "contact_delivery_duration_seconds",
                "Time spent in the delivery port",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        let tracked_sources = IntGauge::new(
            "contact_rate_limit_sources",
            "Sources currently tracked by the rate limiter",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(delivery_duration.clone()))?;
        registry.register(Box::new(tracked_sources.clone()))?;

        Ok(Self {
            registry,
            submissions,
            delivery_duration,
            tracked_sources,
        })
    }

    pub fn record_outcome(&self, outcome: &str) {
        self.submissions.with_label_values(&[outcome]).inc();
    }

    pub fn observe_delivery(&self, seconds: f64) {
        self.delivery_duration.observe(seconds);
    }

    pub fn set_tracked_sources(&self, count: usize) {
        self.tracked_sources.set(count as i64);
    }

    pub fn outcome_count(&self, outcome: &str) -> u64 {
        self.submissions.with_label_values(&[outcome]).get()
    }

    /// Render the registry in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcomes_are_counted_and_rendered() {
        let metrics = IntakeMetrics::new().unwrap();
        metrics.record_outcome("delivered");
        metrics.record_outcome("delivered");
        metrics.record_outcome("rate_limited");
        metrics.set_tracked_sources(3);

        assert_eq!(metrics.outcome_count("delivered"), 2);

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"contact_submissions_total{outcome="delivered"} 2"#));
        assert!(text.contains(r#"contact_submissions_total{outcome="rate_limited"} 1"#));
        assert!(text.contains("contact_rate_limit_sources 3"));
    }
}
