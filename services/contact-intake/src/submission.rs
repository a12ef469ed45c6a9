// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form submission as it arrives on the wire.

use serde::{Deserialize, Deserializer, Serialize};

/// One contact form submission.
///
/// Absent and `null` fields deserialize as empty strings so that the
/// validator, not the JSON layer, decides what "missing" means.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    /// Honeypot. Hidden from humans; anything in it marks the submission as spam.
    #[serde(default, rename = "website", deserialize_with = "null_as_empty")]
    pub honeypot: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Submission {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
            honeypot: String::new(),
        }
    }

    /// Set the honeypot field, as a form-filling bot would.
    pub fn with_honeypot(mut self, honeypot: impl Into<String>) -> Self {
        self.honeypot = honeypot.into();
        self
    }
}

/// Length-bounded submission fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Message,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "Name"),
            Self::Message => write!(f, "Message"),
        }
    }
}
