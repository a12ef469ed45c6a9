// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! The intake pipeline.
//!
//! One call turns a submission and a source id into an [`Outcome`]:
//!
//! 1. Honeypot, required fields, email shape, length bounds
//! 2. Per-source rate limit (only submissions that passed step 1 are counted)
//! 3. Delivery through the configured [`DeliveryPort`]
//!
//! `handle` never fails and never panics on user input. A delivery port that
//! errors or panics yields [`Outcome::DeliveryFailed`].

use crate::delivery::{DeliveryError, DeliveryPort};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics::IntakeMetrics;
use crate::submission::Submission;
use crate::validator::{RejectReason, SubmissionValidator, ValidationResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Source id used when the caller cannot name one.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Why a delivery did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The transport is missing required configuration
    NotConfigured,
    /// The transport was tried and failed
    SendFailed,
}

/// Final result of one intake call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Delivered,
    Rejected(RejectReason),
    DeliveryFailed(DeliveryFailure),
}

impl Outcome {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Delivered => "delivered",
            Outcome::Rejected(reason) => reason.code(),
            Outcome::DeliveryFailed(DeliveryFailure::NotConfigured) => "delivery_not_configured",
            Outcome::DeliveryFailed(DeliveryFailure::SendFailed) => "delivery_failed",
        }
    }
}

impl From<&DeliveryError> for DeliveryFailure {
    fn from(err: &DeliveryError) -> Self {
        if err.is_configuration() {
            DeliveryFailure::NotConfigured
        } else {
            DeliveryFailure::SendFailed
        }
    }
}

/// An [`Outcome`] plus the retry hint for rate limited sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disposition {
    pub outcome: Outcome,
    /// Set only for `Rejected(RateLimited)`
    pub retry_after: Option<Duration>,
}

impl From<Outcome> for Disposition {
    fn from(outcome: Outcome) -> Self {
        Self {
            outcome,
            retry_after: None,
        }
    }
}

/// Validates, rate limits and forwards contact submissions.
pub struct IntakeHandler {
    validator: SubmissionValidator,
    limiter: RateLimiter,
    delivery: Arc<dyn DeliveryPort>,
    metrics: Option<IntakeMetrics>,
}

impl IntakeHandler {
    pub fn new(
        validator: SubmissionValidator,
        limiter: RateLimiter,
        delivery: Arc<dyn DeliveryPort>,
    ) -> Self {
        Self {
            validator,
            limiter,
            delivery,
            metrics: None,
        }
    }

    /// Record outcomes and delivery latency in `metrics`.
    pub fn with_metrics(mut self, metrics: IntakeMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn metrics(&self) -> Option<&IntakeMetrics> {
        self.metrics.as_ref()
    }

    /// Run one submission through the pipeline.
    pub async fn handle(
        &self,
        submission: &Submission,
        source_id: &str,
        now: DateTime<Utc>,
    ) -> Outcome {
        self.process(submission, source_id, now).await.outcome
    }

    /// Like [`handle`](Self::handle), also reporting when a rate limited
    /// source may try again.
    pub async fn process(
        &self,
        submission: &Submission,
        source_id: &str,
        now: DateTime<Utc>,
    ) -> Disposition {
        let source_id = if source_id.trim().is_empty() {
            UNKNOWN_SOURCE
        } else {
            source_id
        };

        let disposition = self.run(submission, source_id, now).await;

        match disposition.outcome {
            Outcome::Delivered => info!(source = %source_id, "Submission delivered"),
            Outcome::Rejected(reason) => {
                info!(source = %source_id, reason = reason.code(), "Submission rejected")
            }
            Outcome::DeliveryFailed(failure) => {
                error!(source = %source_id, ?failure, "Submission could not be delivered")
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_outcome(disposition.outcome.label());
            metrics.set_tracked_sources(self.limiter.tracked_sources().await);
        }

        disposition
    }

    async fn run(
        &self,
        submission: &Submission,
        source_id: &str,
        now: DateTime<Utc>,
    ) -> Disposition {
        if let ValidationResult::Rejected(reason) = self.validator.validate(submission) {
            return Outcome::Rejected(reason).into();
        }

        match self.limiter.check(source_id, now).await {
            RateLimitResult::Allowed { remaining, .. } => {
                debug!(source = %source_id, remaining, "Rate limit admitted");
            }
            RateLimitResult::Limited { retry_after } => {
                return Disposition {
                    outcome: Outcome::Rejected(RejectReason::RateLimited),
                    retry_after: Some(retry_after),
                };
            }
        }

        self.deliver(submission).await.into()
    }

    /// Deliver on a separate task so a panicking port cannot take the caller
    /// down. The task runs to completion even if the caller goes away.
    async fn deliver(&self, submission: &Submission) -> Outcome {
        let port = Arc::clone(&self.delivery);
        let submission = submission.clone();
        let started = Instant::now();

        let result = tokio::spawn(async move { port.deliver(&submission).await }).await;

        if let Some(metrics) = &self.metrics {
            metrics.observe_delivery(started.elapsed().as_secs_f64());
        }

        match result {
            Ok(Ok(())) => Outcome::Delivered,
            Ok(Err(err)) => {
                error!(port = self.delivery.name(), error = %err, "Delivery failed");
                Outcome::DeliveryFailed(DeliveryFailure::from(&err))
            }
            Err(join_err) => {
                error!(port = self.delivery.name(), error = %join_err, "Delivery task aborted");
                Outcome::DeliveryFailed(DeliveryFailure::SendFailed)
            }
        }
    }
}
