// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Recording delivery port.

use async_trait::async_trait;
use contact_intake::{DeliveryError, DeliveryPort, Submission};
use std::sync::Mutex;

/// Keeps every delivered submission; can be told to fail.
#[derive(Default)]
pub struct RecordingPort {
    delivered: Mutex<Vec<Submission>>,
    failure: Option<DeliveryError>,
}

impl RecordingPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// A port whose every delivery fails with `error`.
    pub fn failing(error: DeliveryError) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    pub fn delivered(&self) -> Vec<Submission> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

#[async_trait]
impl DeliveryPort for RecordingPort {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, submission: &Submission) -> Result<(), DeliveryError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.delivered.lock().unwrap().push(submission.clone());
        Ok(())
    }
}
