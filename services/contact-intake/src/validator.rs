// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact submission validator.
//!
//! Checks run in a fixed order and stop at the first failure:
//! - Honeypot must be empty
//! - Name, email and message must be present
//! - Email must have a plausible shape
//! - Name and message must fit their length bounds

use crate::config::ValidationConfig;
use crate::submission::{Field, Submission};
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Permissive email shape: `local@domain.tld` with no whitespace and a single `@`.
/// Not RFC 5322; e.g. `a@b..c` passes and quoted local parts fail.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Why a submission was turned away.
///
/// The display strings are the messages shown to the submitter.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    #[error("Spam detected")]
    SpamDetected,

    #[error("Missing required fields")]
    MissingField,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("{0} is too long")]
    FieldTooLong(Field),

    #[error("Too many requests. Please try again later.")]
    RateLimited,
}

impl RejectReason {
    /// Stable label for logs and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SpamDetected => "spam_detected",
            Self::MissingField => "missing_field",
            Self::InvalidEmail => "invalid_email",
            Self::FieldTooLong(Field::Name) => "name_too_long",
            Self::FieldTooLong(Field::Message) => "message_too_long",
            Self::RateLimited => "rate_limited",
        }
    }

    /// Client input errors are never worth retrying unchanged.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::RateLimited)
    }
}

/// Result of validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Submission passed every check
    Accepted,
    /// Submission was rejected
    Rejected(RejectReason),
}

impl ValidationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted)
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            ValidationResult::Accepted => None,
            ValidationResult::Rejected(r) => Some(*r),
        }
    }
}

/// Contact submission validator.
pub struct SubmissionValidator {
    config: ValidationConfig,
    email: Regex,
}

impl SubmissionValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            email: Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"),
        }
    }

    /// Reject submissions whose honeypot field was filled in.
    pub fn check_honeypot(&self, submission: &Submission) -> ValidationResult {
        if submission.honeypot.is_empty() {
            ValidationResult::Accepted
        } else {
            debug!(honeypot_len = submission.honeypot.len(), "Honeypot filled");
            ValidationResult::Rejected(RejectReason::SpamDetected)
        }
    }

    /// Reject submissions with an empty name, email or message.
    pub fn check_required(&self, submission: &Submission) -> ValidationResult {
        let missing = [
            ("name", &submission.name),
            ("email", &submission.email),
            ("message", &submission.message),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty());

        match missing {
            Some((field, _)) => {
                debug!(field, "Missing required field");
                ValidationResult::Rejected(RejectReason::MissingField)
            }
            None => ValidationResult::Accepted,
        }
    }

    /// Check the email against the permissive shape pattern.
    pub fn is_valid_email(&self, email: &str) -> bool {
        self.email.is_match(email)
    }

    /// Enforce name and message length bounds, counted in characters.
    pub fn check_lengths(&self, submission: &Submission) -> ValidationResult {
        let name_len = submission.name.chars().count();
        if name_len > self.config.max_name_length {
            debug!(len = name_len, max = self.config.max_name_length, "Name too long");
            return ValidationResult::Rejected(RejectReason::FieldTooLong(Field::Name));
        }

        let message_len = submission.message.chars().count();
        if message_len > self.config.max_message_length {
            debug!(
                len = message_len,
                max = self.config.max_message_length,
                "Message too long"
            );
            return ValidationResult::Rejected(RejectReason::FieldTooLong(Field::Message));
        }

        ValidationResult::Accepted
    }

    /// Validate a complete submission.
    pub fn validate(&self, submission: &Submission) -> ValidationResult {
        let honeypot = self.check_honeypot(submission);
        if !honeypot.is_accepted() {
            return honeypot;
        }

        let required = self.check_required(submission);
        if !required.is_accepted() {
            return required;
        }

        if !self.is_valid_email(&submission.email) {
            debug!("Email failed shape check");
            return ValidationResult::Rejected(RejectReason::InvalidEmail);
        }

        self.check_lengths(submission)
    }
}
