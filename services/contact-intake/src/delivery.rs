// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Delivery ports for accepted submissions.
//!
//! The intake pipeline only knows [`DeliveryPort`]. Which implementation it
//! gets is decided once at startup by [`from_config`]:
//!
//! - [`NoopLogger`]: writes the submission to the log and reports success
//! - [`SmtpSender`]: relays the submission as an email
//! - [`UnconfiguredTransport`]: SMTP was requested but settings are missing;
//!   every delivery fails with [`DeliveryError::NotConfigured`]

use crate::config::{DeliveryConfig, DeliveryMode, ResolvedSmtp};
use crate::submission::Submission;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Display name used on outgoing mail.
const SENDER_NAME: &str = "Portfolio Contact Form";

/// Delivery failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Delivery transport not configured: {0}")]
    NotConfigured(String),

    #[error("Could not build message: {0}")]
    InvalidMessage(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl DeliveryError {
    /// True when the failure comes from missing or broken configuration
    /// rather than from a send attempt.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NotConfigured(_))
    }
}

/// Somewhere accepted submissions go.
#[async_trait]
pub trait DeliveryPort: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Forward one validated submission. Implementations own their retry and
    /// timeout policy.
    async fn deliver(&self, submission: &Submission) -> Result<(), DeliveryError>;
}

/// Logs submissions instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

#[async_trait]
impl DeliveryPort for NoopLogger {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, submission: &Submission) -> Result<(), DeliveryError> {
        info!(
            name = %submission.name,
            email = %submission.email,
            message_len = submission.message.chars().count(),
            message = %submission.message,
            "Contact form submission"
        );
        Ok(())
    }
}

/// Stands in for SMTP when its settings are incomplete.
#[derive(Debug, Clone)]
pub struct UnconfiguredTransport {
    reason: String,
}

impl UnconfiguredTransport {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl DeliveryPort for UnconfiguredTransport {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn deliver(&self, _submission: &Submission) -> Result<(), DeliveryError> {
        Err(DeliveryError::NotConfigured(self.reason.clone()))
    }
}

/// Relays submissions over authenticated SMTP.
pub struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpSender {
    /// Build the transport. No connection is made until the first send.
    pub fn new(settings: &ResolvedSmtp) -> Result<Self, DeliveryError> {
        let from = parse_address("sender", &settings.from)?;
        let to = parse_address("recipient", &settings.to)?;

        let builder = if settings.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| DeliveryError::NotConfigured(format!("SMTP relay {}: {}", settings.host, e)))?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: Mailbox::new(Some(SENDER_NAME.to_string()), from),
            to: Mailbox::new(None, to),
        })
    }
}

#[async_trait]
impl DeliveryPort for SmtpSender {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn deliver(&self, submission: &Submission) -> Result<(), DeliveryError> {
        let message = compose_message(self.from.clone(), self.to.clone(), submission)?;

        match self.transport.send(message).await {
            Ok(response) => {
                debug!(code = %response.code(), "SMTP relay accepted message");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "SMTP send failed");
                Err(DeliveryError::Transport(e.to_string()))
            }
        }
    }
}

fn parse_address(role: &str, raw: &str) -> Result<Address, DeliveryError> {
    raw.trim().parse::<Address>().map_err(|e| {
        DeliveryError::NotConfigured(format!("invalid {} address {:?}: {}", role, raw, e))
    })
}

/// Build the outgoing email for one submission.
///
/// Reply-To points at the submitter so answering goes straight to them.
pub fn compose_message(
    from: Mailbox,
    to: Mailbox,
    submission: &Submission,
) -> Result<Message, DeliveryError> {
    let reply_address = submission
        .email
        .trim()
        .parse::<Address>()
        .map_err(|e| DeliveryError::InvalidMessage(format!("reply-to address: {}", e)))?;
    let reply_to = Mailbox::new(Some(header_safe(&submission.name)), reply_address);

    Message::builder()
        .from(from)
        .reply_to(reply_to)
        .to(to)
        .subject(subject_for(submission))
        .multipart(MultiPart::alternative_plain_html(
            render_text(submission),
            render_html(submission),
        ))
        .map_err(|e| DeliveryError::InvalidMessage(e.to_string()))
}

/// Subject line naming the sender.
pub fn subject_for(submission: &Submission) -> String {
    format!("New contact form message from {}", header_safe(&submission.name))
}

/// Plain text body.
pub fn render_text(submission: &Submission) -> String {
    format!(
        "Name: {}\nEmail: {}\n\nMessage:\n{}\n",
        submission.name, submission.email, submission.message
    )
}

/// HTML body. User content is escaped and newlines become `<br>`.
pub fn render_html(submission: &Submission) -> String {
    format!(
        "<h2>New contact form message</h2>\n\
         <p><strong>Name:</strong> {}</p>\n\
         <p><strong>Email:</strong> {}</p>\n\
         <p><strong>Message:</strong></p>\n\
         <p>{}</p>\n",
        html_escape::encode_safe(&submission.name),
        html_escape::encode_safe(&submission.email),
        line_breaks(&html_escape::encode_safe(&submission.message)),
    )
}

fn line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "<br>")
}

/// Strip control characters so user input cannot fold into extra headers.
fn header_safe(value: &str) -> String {
    value.chars().filter(|c| !c.is_control()).collect()
}

/// Resolve the configured delivery port.
pub fn from_config(config: &DeliveryConfig) -> Arc<dyn DeliveryPort> {
    match config.mode {
        DeliveryMode::Log => {
            info!("Delivering submissions to the log");
            Arc::new(NoopLogger)
        }
        DeliveryMode::Smtp => match config.smtp.resolve() {
            Ok(settings) => match SmtpSender::new(&settings) {
                Ok(sender) => {
                    info!(
                        host = %settings.host,
                        port = settings.port,
                        secure = settings.secure,
                        "Delivering submissions over SMTP"
                    );
                    Arc::new(sender)
                }
                Err(e) => {
                    warn!(error = %e, "SMTP transport unusable, submissions will fail");
                    Arc::new(UnconfiguredTransport::new(e.to_string()))
                }
            },
            Err(e) => {
                warn!(
                    error = %e,
                    "SMTP delivery selected but not configured, submissions will fail"
                );
                Arc::new(UnconfiguredTransport::new(e.to_string()))
            }
        },
    }
}
