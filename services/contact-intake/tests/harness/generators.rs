// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for abuse simulation.

use contact_intake::Submission;
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of source ids (IPv4 strings) for testing.
pub fn generate_sources(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c)).to_string()
        })
        .collect()
}

/// Generate distinct, valid submissions.
pub fn generate_submissions(count: usize) -> Vec<Submission> {
    (0..count)
        .map(|i| {
            Submission::new(
                format!("Visitor {}", i),
                format!("visitor{}@example.com", i),
                format!("Hello, this is message number {}.\nThanks!", i),
            )
        })
        .collect()
}

/// Honeypot values a form-filling bot might produce.
pub fn generate_honeypot_values() -> Vec<&'static str> {
    vec![
        "http://cheap-pills.example",
        "https://example.com",
        "www.example.com",
        "a",
        " ",
        "\t",
        "0",
        "false",
    ]
}

/// Addresses the shape check must reject.
pub fn generate_malformed_emails() -> Vec<&'static str> {
    vec![
        "not-an-email",
        "@example.com",
        "user@",
        "user@example",
        "user@@example.com",
        "user @example.com",
        "user@exa mple.com",
        "user@example.com ",
        " user@example.com",
        "user@example.",
        "user@.com",
    ]
}

/// Addresses the shape check accepts, including ones that are not
/// deliverable.
pub fn generate_permissive_emails() -> Vec<&'static str> {
    vec![
        "a@b.c",
        "jo@x.com",
        "first.last+tag@sub.example.co.uk",
        "a@b..c",
        "a.@b.c",
        "\"quoted\"@example.com",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sources() {
        let sources = generate_sources(256);
        assert_eq!(sources.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = sources.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_generate_submissions() {
        let submissions = generate_submissions(10);
        assert_eq!(submissions.len(), 10);
        assert!(submissions.iter().all(|s| s.honeypot.is_empty()));
    }
}
