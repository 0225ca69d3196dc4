/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Two-stage scheduling policy: which frequency, then which job.
//!
//! Both decisions are pure functions of the current ready set (jobs that have
//! arrived and still have work).  Nothing here holds state between calls, so
//! repeated calls with the same ready set always return the same answer.
//!
//! # Frequency selection (`eadvfs` governor)
//!
//! | Condition (checked in order) | Level |
//! |---|---|
//! | `short_frac > 0.6` or `util_pred > utilization_threshold` | highest |
//! | `avg_rem > 200 ms` | lowest |
//! | otherwise | medium (index 1) |
//!
//! where `short_frac` is the share of ready jobs with at most
//! `short_job_threshold_ms` left, `util_pred = min(1, Σ remaining / lookahead)`
//! and `avg_rem` is the mean remaining demand.
//!
//! Bursts of short jobs or a predicted overload race to drain the queue; long
//! latency-tolerant jobs run slow.  The `performance` and `powersave`
//! governors pin the highest and lowest level respectively and exist as
//! comparison baselines.
//!
//! # Job selection
//! Shortest-remaining-time-first.  Ties go to the first job in the ready set,
//! which the engine builds in job-id order.

pub mod error;

pub use error::PolicyError;

use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::job::Job;
use crate::power::FrequencySelection;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Jobs with at most this much remaining demand count as "short".
pub const DEFAULT_SHORT_JOB_THRESHOLD_MS: f64 = 30.0;

/// Share of short jobs above which the highest level is chosen.
pub const DEFAULT_SHORT_FRACTION_THRESHOLD: f64 = 0.6;

/// Predicted utilisation above which the highest level is chosen.
pub const DEFAULT_UTILIZATION_THRESHOLD: f64 = 0.6;

/// Mean remaining demand above which the lowest level is chosen.
pub const DEFAULT_LONG_JOB_AVG_MS: f64 = 200.0;

// ── PolicyConfig ──────────────────────────────────────────────────────────────

/// Tunable thresholds of the adaptive frequency heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyConfig {
    pub short_job_threshold_ms: f64,
    pub short_fraction_threshold: f64,
    pub utilization_threshold: f64,
    pub long_job_avg_ms: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            short_job_threshold_ms: DEFAULT_SHORT_JOB_THRESHOLD_MS,
            short_fraction_threshold: DEFAULT_SHORT_FRACTION_THRESHOLD,
            utilization_threshold: DEFAULT_UTILIZATION_THRESHOLD,
            long_job_avg_ms: DEFAULT_LONG_JOB_AVG_MS,
        }
    }
}

impl PolicyConfig {
    /// Reject negative or non-finite thresholds, and fractions above 1.0.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let non_negative = [
            ("short_job_threshold_ms", self.short_job_threshold_ms),
            ("long_job_avg_ms", self.long_job_avg_ms),
        ];
        let fractions = [
            ("short_fraction_threshold", self.short_fraction_threshold),
            ("utilization_threshold", self.utilization_threshold),
        ];

        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(PolicyError::InvalidThreshold { name, value });
            }
        }
        for (name, value) in fractions {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PolicyError::InvalidThreshold { name, value });
            }
        }
        Ok(())
    }
}

// ── LoadEstimate ──────────────────────────────────────────────────────────────

/// The three ready-set statistics the adaptive heuristic decides on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadEstimate {
    /// Fraction of ready jobs whose remaining demand is "short".
    pub short_frac: f64,
    /// `min(1, Σ remaining / lookahead)`.
    pub util_pred: f64,
    /// Mean remaining demand in ms.
    pub avg_rem_ms: f64,
}

impl LoadEstimate {
    /// Compute the estimate, or `None` for an empty ready set.
    ///
    /// The lookahead window is floored at 1 ms so a zero window cannot divide
    /// by zero.
    pub fn from_ready(ready: &[&Job], short_job_threshold_ms: f64, lookahead_ms: f64) -> Option<Self> {
        if ready.is_empty() {
            return None;
        }

        let count = ready.len() as f64;
        let sum_rem: f64 = ready.iter().map(|j| j.remaining_ms()).sum();
        let short = ready
            .iter()
            .filter(|j| j.remaining_ms() <= short_job_threshold_ms)
            .count();

        Some(Self {
            short_frac: short as f64 / count,
            util_pred: (sum_rem / lookahead_ms.max(1.0)).min(1.0),
            avg_rem_ms: sum_rem / count,
        })
    }
}

// ── Governor ──────────────────────────────────────────────────────────────────

/// Frequency governor used by a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Governor {
    /// The adaptive energy-aware heuristic.
    #[default]
    Adaptive,
    /// Always the highest level.
    Performance,
    /// Always the lowest level.
    Powersave,
}

impl Governor {
    pub fn name(self) -> &'static str {
        match self {
            Governor::Adaptive => "eadvfs",
            Governor::Performance => "performance",
            Governor::Powersave => "powersave",
        }
    }

    /// Pick a frequency for the given ready set.
    ///
    /// Returns `None` when the ready set is empty; the engine never asks in
    /// that case and falls back to the lowest level if it ever gets `None`.
    pub fn select_frequency(
        self,
        ready: &[&Job],
        config: &PolicyConfig,
        lookahead_ms: f64,
    ) -> Option<FrequencySelection> {
        if ready.is_empty() {
            return None;
        }
        match self {
            Governor::Adaptive => select_frequency(ready, config, lookahead_ms),
            Governor::Performance => Some(FrequencySelection::Highest),
            Governor::Powersave => Some(FrequencySelection::Lowest),
        }
    }
}

impl FromStr for Governor {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eadvfs" | "adaptive" => Ok(Governor::Adaptive),
            "performance" => Ok(Governor::Performance),
            "powersave" => Ok(Governor::Powersave),
            other => Err(PolicyError::UnknownGovernor(other.to_string())),
        }
    }
}

impl fmt::Display for Governor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Decision functions ────────────────────────────────────────────────────────

/// Adaptive frequency selection over `ready` with a `lookahead_ms` window.
pub fn select_frequency(
    ready: &[&Job],
    config: &PolicyConfig,
    lookahead_ms: f64,
) -> Option<FrequencySelection> {
    let load = LoadEstimate::from_ready(ready, config.short_job_threshold_ms, lookahead_ms)?;

    let selection = if load.short_frac > config.short_fraction_threshold
        || load.util_pred > config.utilization_threshold
    {
        FrequencySelection::Highest
    } else if load.avg_rem_ms > config.long_job_avg_ms {
        FrequencySelection::Lowest
    } else {
        FrequencySelection::Medium
    };

    trace!(
        ready = ready.len(),
        short_frac = load.short_frac,
        util_pred = load.util_pred,
        avg_rem_ms = load.avg_rem_ms,
        ?selection,
        "frequency selected"
    );

    Some(selection)
}

/// Shortest-remaining-time-first: position in `ready` of the job to run.
///
/// Only a strictly smaller remaining demand displaces the current best, so
/// the earliest entry wins ties.
pub fn select_job(ready: &[&Job]) -> Option<usize> {
    let (first, rest) = ready.split_first()?;
    let mut best = 0usize;
    let mut best_rem = first.remaining_ms();

    for (offset, job) in rest.iter().enumerate() {
        if job.remaining_ms() < best_rem {
            best_rem = job.remaining_ms();
            best = offset + 1;
        }
    }
    Some(best)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
