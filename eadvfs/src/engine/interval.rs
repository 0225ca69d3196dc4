/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pure arithmetic for the "how long do we run" step.
//!
//! These are free functions rather than methods so the termination and
//! epsilon-guard logic can be tested independently of the [`Simulation`].
//!
//! [`Simulation`]: super::Simulation

use crate::job::Job;

/// What ended a run interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalLimit {
    /// The running job finishes.
    Completion,
    /// A job arrives and may preempt.
    Arrival,
    /// The quantum cap was hit.
    Quantum,
}

/// The single authoritative run interval for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunInterval {
    pub start_ms: f64,
    pub end_ms: f64,
    pub limit: IntervalLimit,
}

impl RunInterval {
    /// Length of the interval.  May be `<= 0` only through floating-point
    /// collapse; the engine treats that as a degenerate step.
    pub fn duration_ms(&self) -> f64 {
        self.end_ms - self.start_ms
    }

    pub fn is_degenerate(&self) -> bool {
        self.duration_ms() <= 0.0
    }
}

/// Earliest arrival strictly after `now_ms`, if any.
pub fn next_arrival_after(jobs: &[Job], now_ms: f64) -> Option<f64> {
    jobs.iter()
        .map(|j| j.arrival_ms)
        .filter(|&a| a > now_ms)
        .min_by(f64::total_cmp)
}

/// Wall-clock time to finish `remaining_ms` of reference work at `speed`.
pub fn time_to_finish_ms(remaining_ms: f64, speed: f64) -> f64 {
    remaining_ms / speed
}

/// Compute the end of the next run interval starting at `now_ms`.
///
/// The interval ends at the earliest of:
/// 1. the running job's completion at `speed`,
/// 2. the next arrival (`next_arrival_ms`), which may preempt,
/// 3. `now_ms + quantum_ms`.
///
/// On exact ties the earlier entry in that list is reported as the limit.
pub fn plan_run(
    now_ms: f64,
    remaining_ms: f64,
    speed: f64,
    next_arrival_ms: Option<f64>,
    quantum_ms: f64,
) -> RunInterval {
    let mut end_ms = now_ms + time_to_finish_ms(remaining_ms, speed);
    let mut limit = IntervalLimit::Completion;

    if let Some(arrival) = next_arrival_ms {
        if arrival < end_ms {
            end_ms = arrival;
            limit = IntervalLimit::Arrival;
        }
    }

    let cap = now_ms + quantum_ms;
    if cap < end_ms {
        end_ms = cap;
        limit = IntervalLimit::Quantum;
    }

    RunInterval {
        start_ms: now_ms,
        end_ms,
        limit,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobSpec;

    // ── next_arrival_after ────────────────────────────────────────────────────

    #[test]
    fn next_arrival_is_strictly_after_now() {
        let jobs: Vec<Job> = [(0.0, 10.0), (20.0, 5.0), (20.0, 7.0), (40.0, 1.0)]
            .iter()
            .enumerate()
            .map(|(i, &p)| Job::new(i as u32 + 1, p.into()))
            .collect();
        assert_eq!(next_arrival_after(&jobs, 0.0), Some(20.0));
        assert_eq!(next_arrival_after(&jobs, 20.0), Some(40.0));
        assert_eq!(next_arrival_after(&jobs, 40.0), None);
    }

    #[test]
    fn next_arrival_ignores_input_order() {
        let jobs = vec![
            Job::new(1, JobSpec::new(300.0, 1.0)),
            Job::new(2, JobSpec::new(100.0, 1.0)),
        ];
        assert_eq!(next_arrival_after(&jobs, 0.0), Some(100.0));
    }

    // ── plan_run ──────────────────────────────────────────────────────────────

    #[test]
    fn completion_bounds_the_interval() {
        let iv = plan_run(0.0, 40.0, 2.0, None, 50.0);
        assert_eq!(iv.end_ms, 20.0);
        assert_eq!(iv.limit, IntervalLimit::Completion);
        assert_eq!(iv.duration_ms(), 20.0);
    }

    #[test]
    fn arrival_preempts() {
        let iv = plan_run(10.0, 100.0, 1.0, Some(25.0), 50.0);
        assert_eq!(iv.end_ms, 25.0);
        assert_eq!(iv.limit, IntervalLimit::Arrival);
    }

    #[test]
    fn quantum_caps_long_runs() {
        let iv = plan_run(100.0, 400.0, 1.0, Some(1_000.0), 50.0);
        assert_eq!(iv.end_ms, 150.0);
        assert_eq!(iv.limit, IntervalLimit::Quantum);
    }

    #[test]
    fn tie_between_completion_and_arrival_reports_completion() {
        let iv = plan_run(0.0, 30.0, 1.0, Some(30.0), 50.0);
        assert_eq!(iv.end_ms, 30.0);
        assert_eq!(iv.limit, IntervalLimit::Completion);
    }

    #[test]
    fn tie_between_completion_and_quantum_reports_completion() {
        let iv = plan_run(0.0, 100.0, 2.0, None, 50.0);
        assert_eq!(iv.limit, IntervalLimit::Completion);
    }

    #[test]
    fn collapsed_interval_is_degenerate() {
        // Work below the clock's resolution: now + tiny == now.
        let now = 1.0e12;
        let iv = plan_run(now, 1.0e-6, 1.0, None, 50.0);
        assert!(iv.is_degenerate());
        assert!(!plan_run(0.0, 1.0, 1.0, None, 50.0).is_degenerate());
    }
}
