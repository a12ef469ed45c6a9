// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Intake
//!
//! This crate accepts contact form submissions for the portfolio site and
//! forwards the legitimate ones:
//!
//! - Honeypot field spam rejection
//! - Required field, email shape and length validation
//! - Per-source sliding window rate limiting (5 per minute default)
//! - Delivery to the log or over SMTP, selected at startup

pub mod config;
pub mod delivery;
pub mod handlers;
pub mod intake;
pub mod limiter;
pub mod metrics;
pub mod submission;
pub mod validator;

pub use config::Config;
pub use delivery::{DeliveryError, DeliveryPort};
pub use intake::{DeliveryFailure, IntakeHandler, Outcome};
pub use limiter::{RateLimitResult, RateLimiter};
pub use submission::{Field, Submission};
pub use validator::{RejectReason, SubmissionValidator, ValidationResult};
