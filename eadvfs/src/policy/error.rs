/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for scheduling-policy configuration.

use thiserror::Error;

/// Returned when a governor name or a policy threshold is unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    /// The governor string is not recognised.
    #[error("unknown governor: '{0}' (valid: eadvfs, performance, powersave)")]
    UnknownGovernor(String),

    /// A threshold is negative, non-finite, or (for fractions) above 1.0.
    #[error("policy threshold '{name}' has invalid value {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
}
