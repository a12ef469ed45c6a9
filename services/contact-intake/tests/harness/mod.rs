// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for contact intake abuse simulation.
//!
//! This module provides utilities for simulating spam and flood patterns
//! against the intake pipeline to validate its controls.

#![allow(dead_code)]

pub mod attacks;
pub mod delivery;
pub mod generators;
pub mod metrics;
