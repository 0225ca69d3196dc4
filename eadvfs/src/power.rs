/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Processor power model: discrete DVFS levels plus an idle draw.
//!
//! The level table is validated once at construction and is read-only
//! afterwards, so a [`PowerModel`] can be shared (`Arc`) by any number of
//! simulation runs.
//!
//! Levels are stored in **strictly ascending speed order**.  Policies never
//! handle raw indices; they return a [`FrequencySelection`] which is resolved
//! against the table here, so "lowest", "medium" and "highest" always mean the
//! same thing regardless of how many levels a table has.

use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why a level table was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PowerModelError {
    #[error("power model has no frequency levels")]
    NoLevels,

    #[error("level {index} ('{label}') has invalid speed {speed} (must be finite and > 0)")]
    InvalidSpeed {
        index: usize,
        label: String,
        speed: f64,
    },

    #[error("level {index} ('{label}') has invalid power {power_w}W (must be finite and > 0)")]
    InvalidPower {
        index: usize,
        label: String,
        power_w: f64,
    },

    #[error("levels must be in strictly ascending speed order: level {index} speed {speed} <= previous {previous}")]
    NotAscending {
        index: usize,
        speed: f64,
        previous: f64,
    },

    #[error("idle power {0}W is invalid (must be finite and >= 0)")]
    InvalidIdlePower(f64),
}

// ── FrequencyLevel ────────────────────────────────────────────────────────────

/// One operating point of the processor.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyLevel {
    /// Speed relative to the reference frequency (1.0 = reference).
    pub speed: f64,
    /// Power draw in Watts while running at this level (static included).
    pub power_w: f64,
    /// Human-readable name, e.g. `"1.5GHz"`.
    pub label: String,
}

impl FrequencyLevel {
    pub fn new(speed: f64, power_w: f64, label: impl Into<String>) -> Self {
        Self {
            speed,
            power_w,
            label: label.into(),
        }
    }
}

// ── FrequencySelection ────────────────────────────────────────────────────────

/// A policy's choice of operating point, independent of table size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencySelection {
    /// Index 0: slowest, lowest power.
    Lowest,
    /// Index 1 when the table has one; falls back to index 0 otherwise.
    Medium,
    /// Last index: fastest, highest power.
    Highest,
}

// ── PowerModel ────────────────────────────────────────────────────────────────

/// Validated, ascending table of frequency levels plus idle power.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerModel {
    levels: Vec<FrequencyLevel>,
    idle_power_w: f64,
}

impl PowerModel {
    /// Build a power model, validating every level.
    ///
    /// # Errors
    /// * [`PowerModelError::NoLevels`] for an empty table.
    /// * [`PowerModelError::InvalidSpeed`] / [`PowerModelError::InvalidPower`]
    ///   for non-positive or non-finite values.
    /// * [`PowerModelError::NotAscending`] if speeds are not strictly
    ///   increasing.
    /// * [`PowerModelError::InvalidIdlePower`] for a negative idle draw.
    pub fn new(levels: Vec<FrequencyLevel>, idle_power_w: f64) -> Result<Self, PowerModelError> {
        if levels.is_empty() {
            return Err(PowerModelError::NoLevels);
        }
        if !idle_power_w.is_finite() || idle_power_w < 0.0 {
            return Err(PowerModelError::InvalidIdlePower(idle_power_w));
        }

        for (index, level) in levels.iter().enumerate() {
            if !level.speed.is_finite() || level.speed <= 0.0 {
                return Err(PowerModelError::InvalidSpeed {
                    index,
                    label: level.label.clone(),
                    speed: level.speed,
                });
            }
            if !level.power_w.is_finite() || level.power_w <= 0.0 {
                return Err(PowerModelError::InvalidPower {
                    index,
                    label: level.label.clone(),
                    power_w: level.power_w,
                });
            }
        }

        for (index, pair) in levels.windows(2).enumerate() {
            if pair[1].speed <= pair[0].speed {
                return Err(PowerModelError::NotAscending {
                    index: index + 1,
                    speed: pair[1].speed,
                    previous: pair[0].speed,
                });
            }
        }

        Ok(Self {
            levels,
            idle_power_w,
        })
    }

    pub fn levels(&self) -> &[FrequencyLevel] {
        &self.levels
    }

    pub fn idle_power_w(&self) -> f64 {
        self.idle_power_w
    }

    /// Whether [`FrequencySelection::Medium`] maps to its own level rather
    /// than falling back to the lowest one.
    pub fn has_distinct_medium(&self) -> bool {
        self.levels.len() > 1
    }

    /// Map a policy selection onto an index into [`levels`](Self::levels).
    pub fn resolve(&self, selection: FrequencySelection) -> usize {
        match selection {
            FrequencySelection::Lowest => 0,
            FrequencySelection::Medium if self.levels.len() > 1 => 1,
            FrequencySelection::Medium => 0,
            FrequencySelection::Highest => self.levels.len() - 1,
        }
    }
}

impl Default for PowerModel {
    /// Three illustrative levels: 1.0× @ 1.5 W, 1.5× @ 2.6 W, 2.0× @ 4.5 W;
    /// 0.2 W deep idle.
    fn default() -> Self {
        Self {
            levels: vec![
                FrequencyLevel::new(1.0, 1.5, "1.0GHz"),
                FrequencyLevel::new(1.5, 2.6, "1.5GHz"),
                FrequencyLevel::new(2.0, 4.5, "2.0GHz"),
            ],
            idle_power_w: 0.2,
        }
    }
}

/// Energy in Joules for drawing `power_w` Watts over `duration_ms`.
pub fn energy_j(power_w: f64, duration_ms: f64) -> f64 {
    power_w * (duration_ms / 1000.0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
