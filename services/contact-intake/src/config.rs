// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact intake service.
//!
//! Defaults match the contact form policy: 5 submissions per source per
//! minute, names up to 100 characters and messages up to 5000.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Configuration for the contact intake service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Delivery configuration
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Origins allowed to post the form. Empty means any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

/// Per-source sliding window limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum admitted submissions per source within one window (default: 5)
    #[serde(default = "default_max_per_window")]
    pub max_per_window: u32,

    /// Window length in milliseconds (default: 60000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Upper bound on tracked sources (default: 10000)
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,

    /// Sources idle for longer than this are dropped by cleanup (default: 300)
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,

    /// Interval between cleanup sweeps in seconds (default: 60)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

/// Field length bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum name length in characters (default: 100)
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,

    /// Maximum message length in characters (default: 5000)
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
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

/// Which delivery port accepted submissions are forwarded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Log submissions and report success
    #[default]
    Log,
    /// Relay submissions over SMTP
    Smtp,
}

impl FromStr for DeliveryMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" | "noop" => Ok(Self::Log),
            "smtp" | "email" => Ok(Self::Smtp),
            other => Err(ConfigError::Invalid {
                key: "DELIVERY_MODE",
                value: other.to_string(),
            }),
        }
    }
}

/// Delivery configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub mode: DeliveryMode,

    #[serde(default)]
    pub smtp: SmtpSettings,
}

/// Raw SMTP settings as read from the environment. Every field is optional
/// here; [`SmtpSettings::resolve`] decides whether they are usable.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Implicit TLS. Defaults to `port == 465` when unset.
    pub secure: Option<bool>,
    /// Sender address. Defaults to `username`.
    pub from: Option<String>,
    /// Recipient address. Defaults to `username`.
    pub to: Option<String>,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("secure", &self.secure)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// SMTP settings with every required value present.
#[derive(Clone)]
pub struct ResolvedSmtp {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub secure: bool,
    pub from: String,
    pub to: String,
}

impl std::fmt::Debug for ResolvedSmtp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSmtp")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("secure", &self.secure)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting(s): {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl SmtpSettings {
    /// Check that host, port, username and password are all present.
    ///
    /// Empty strings count as missing.
    pub fn resolve(&self) -> Result<ResolvedSmtp, ConfigError> {
        let mut missing = Vec::new();
        let host = present(&self.host);
        if host.is_none() {
            missing.push("SMTP_HOST");
        }
        if self.port.is_none() {
            missing.push("SMTP_PORT");
        }
        let username = present(&self.username);
        if username.is_none() {
            missing.push("SMTP_USER");
        }
        // Passwords are taken verbatim; only an absent or empty one is missing.
        let password = self.password.as_deref().filter(|s| !s.is_empty());
        if password.is_none() {
            missing.push("SMTP_PASS");
        }

        match (host, self.port, username, password) {
            (Some(host), Some(port), Some(username), Some(password)) => {
                let from = present(&self.from).unwrap_or(username).to_string();
                let to = present(&self.to).unwrap_or(username).to_string();
                Ok(ResolvedSmtp {
                    host: host.to_string(),
                    port,
                    username: username.to_string(),
                    password: password.to_string(),
                    secure: self.secure.unwrap_or(port == 465),
                    from,
                    to,
                })
            }
            _ => Err(ConfigError::Missing(missing)),
        }
    }
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_per_window() -> u32 {
    5
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_max_sources() -> usize {
    10_000
}

fn default_idle_ttl_secs() -> u64 {
    300
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

fn default_max_name_length() -> usize {
    100
}

fn default_max_message_length() -> usize {
    5000
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
            rate_limit: RateLimitConfig::default(),
            validation: ValidationConfig::default(),
            metrics: MetricsConfig::default(),
            delivery: DeliveryConfig::default(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_window: default_max_per_window(),
            window_ms: default_window_ms(),
            max_sources: default_max_sources(),
            idle_ttl_secs: default_idle_ttl_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_name_length: default_max_name_length(),
            max_message_length: default_max_message_length(),
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

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Get the idle source TTL
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }

    /// Get the cleanup sweep interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }

    /// Longest accepted window: one day.
    pub const MAX_WINDOW_MS: u64 = 24 * 60 * 60 * 1000;

    /// Longest accepted idle TTL: one week.
    pub const MAX_IDLE_TTL_SECS: u64 = 7 * 24 * 60 * 60;

    /// Bring the window and idle TTL into the range the ledger can do
    /// timestamp arithmetic with.
    pub fn clamped(mut self) -> Self {
        let window_ms = self.window_ms.clamp(1, Self::MAX_WINDOW_MS);
        if window_ms != self.window_ms {
            warn!(configured = self.window_ms, used = window_ms, "Clamping rate limit window");
            self.window_ms = window_ms;
        }

        let idle_ttl_secs = self.idle_ttl_secs.min(Self::MAX_IDLE_TTL_SECS);
        if idle_ttl_secs != self.idle_ttl_secs {
            warn!(
                configured = self.idle_ttl_secs,
                used = idle_ttl_secs,
                "Clamping rate limit idle TTL"
            );
            self.idle_ttl_secs = idle_ttl_secs;
        }

        self
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unparseable values are logged and replaced by their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let delivery_mode = match get("DELIVERY_MODE").map(|v| v.parse::<DeliveryMode>()) {
            Some(Ok(mode)) => mode,
            Some(Err(err)) => {
                warn!(error = %err, "Falling back to log delivery");
                DeliveryMode::Log
            }
            None => DeliveryMode::Log,
        };

        Config {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            rate_limit: RateLimitConfig {
                max_per_window: parse_or(
                    &get,
                    "RATE_LIMIT_MAX",
                    defaults.rate_limit.max_per_window,
                ),
                window_ms: parse_or(&get, "RATE_LIMIT_WINDOW_MS", defaults.rate_limit.window_ms),
                max_sources: parse_or(
                    &get,
                    "RATE_LIMIT_MAX_SOURCES",
                    defaults.rate_limit.max_sources,
                ),
                idle_ttl_secs: parse_or(
                    &get,
                    "RATE_LIMIT_IDLE_TTL_SECS",
                    defaults.rate_limit.idle_ttl_secs,
                ),
                cleanup_interval_secs: parse_or(
                    &get,
                    "RATE_LIMIT_CLEANUP_SECS",
                    defaults.rate_limit.cleanup_interval_secs,
                ),
            }
            .clamped(),
            validation: ValidationConfig {
                max_name_length: parse_or(
                    &get,
                    "MAX_NAME_LENGTH",
                    defaults.validation.max_name_length,
                ),
                max_message_length: parse_or(
                    &get,
                    "MAX_MESSAGE_LENGTH",
                    defaults.validation.max_message_length,
                ),
            },
            metrics: MetricsConfig {
                enabled: parse_or(&get, "METRICS_ENABLED", defaults.metrics.enabled),
                ..defaults.metrics
            },
            delivery: DeliveryConfig {
                mode: delivery_mode,
                smtp: SmtpSettings {
                    host: get("SMTP_HOST"),
                    port: get("SMTP_PORT").and_then(|v| match v.trim().parse() {
                        Ok(port) => Some(port),
                        Err(_) => {
                            warn!(key = "SMTP_PORT", value = %v, "Ignoring unparseable setting");
                            None
                        }
                    }),
                    username: get("SMTP_USER"),
                    password: lookup("SMTP_PASS").filter(|v| !v.is_empty()),
                    secure: get("SMTP_SECURE").and_then(|v| v.trim().parse().ok()),
                    from: get("CONTACT_FROM"),
                    to: get("CONTACT_TO"),
                },
            },
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> T
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Ignoring unparseable setting, using default");
            default
        }),
        None => default,
    }
}
