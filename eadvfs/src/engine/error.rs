/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for setting up a simulation run.
//!
//! Only set-up can fail.  Once [`Simulation::new`] has accepted the workload
//! and parameters, [`Simulation::run`] always terminates with a
//! [`RunOutcome`]; idle gaps, preemption, degenerate intervals and the horizon
//! stop are ordinary control flow.
//!
//! [`Simulation::new`]: super::Simulation::new
//! [`Simulation::run`]: super::Simulation::run
//! [`RunOutcome`]: super::RunOutcome

use thiserror::Error;

use crate::job::JobId;
use crate::policy::PolicyError;

/// Why a job was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum JobRejection {
    /// Arrival is negative, NaN or infinite.
    InvalidArrival(f64),
    /// Burst is zero, negative, NaN or infinite.
    InvalidBurst(f64),
}

impl std::fmt::Display for JobRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobRejection::InvalidArrival(v) => {
                write!(f, "arrival {v}ms must be finite and >= 0")
            }
            JobRejection::InvalidBurst(v) => {
                write!(f, "burst {v}ms must be finite and > 0")
            }
        }
    }
}

/// Top-level error returned by [`Simulation::new`](super::Simulation::new).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// The workload contained no jobs.
    #[error("no jobs provided — workload is empty")]
    NoJobs,

    /// A job's arrival or burst is unusable.
    #[error("job {id} rejected: {reason}")]
    InvalidJob { id: JobId, reason: JobRejection },

    /// An engine parameter is out of range.
    #[error("engine parameter '{name}' has invalid value {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// The policy thresholds failed validation.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}
