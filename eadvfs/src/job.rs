/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Job data structures for the EADVFS simulator.
//!
//! Two types model the two sides of a simulation run:
//!
//! ```text
//! workload file ──(arrival, burst)──►  JobSpec  ──(Simulation::new)──►  Job  ──(report)──►  JobSummary
//!                                       ↑ input                         ↑ runtime state
//!                                       immutable                       remaining / start / finish
//! ```
//!
//! # Ownership model
//! `Job` is **owned** by the [`Simulation`](crate::engine::Simulation) for the
//! duration of one run.  Only the engine mutates it, and only through
//! [`Job::apply_work`] and [`Job::mark_started`], which keep the invariants:
//!
//! * `remaining_ms` never goes negative and never increases during a run.
//! * `finish_ms`, once set, is never revised.
//! * `start_ms <= finish_ms` whenever both are set.

/// Stable job identifier (1-based, in workload order).
pub type JobId = u32;

// ── JobSpec (input) ───────────────────────────────────────────────────────────

/// One workload item as read from the input: arrival time and total demand.
///
/// Both values are in milliseconds; `burst_ms` is measured at the reference
/// (1.0×) frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobSpec {
    pub arrival_ms: f64,
    pub burst_ms: f64,
}

impl JobSpec {
    pub fn new(arrival_ms: f64, burst_ms: f64) -> Self {
        Self {
            arrival_ms,
            burst_ms,
        }
    }
}

impl From<(f64, f64)> for JobSpec {
    fn from((arrival_ms, burst_ms): (f64, f64)) -> Self {
        Self::new(arrival_ms, burst_ms)
    }
}

// ── Job (runtime state) ───────────────────────────────────────────────────────

/// A unit of work plus its mutable runtime state.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    // ── Identity (fixed at creation) ──────────────────────────────────────────
    pub id: JobId,

    /// Arrival time in ms.
    pub arrival_ms: f64,

    /// Total demand in ms of reference-frequency work.
    pub burst_ms: f64,

    // ── Runtime state (owned by the engine) ───────────────────────────────────
    /// Work still to do, in ms at the reference frequency.
    remaining_ms: f64,

    /// Time of the first dispatch.  `None` until the job is first scheduled.
    start_ms: Option<f64>,

    /// Completion time.  `None` until `remaining_ms` drops below epsilon.
    finish_ms: Option<f64>,
}

impl Job {
    pub fn new(id: JobId, spec: JobSpec) -> Self {
        Self {
            id,
            arrival_ms: spec.arrival_ms,
            burst_ms: spec.burst_ms,
            remaining_ms: spec.burst_ms,
            start_ms: None,
            finish_ms: None,
        }
    }

    pub fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }

    pub fn start_ms(&self) -> Option<f64> {
        self.start_ms
    }

    pub fn finish_ms(&self) -> Option<f64> {
        self.finish_ms
    }

    /// `true` once the job has been stamped complete.
    pub fn is_complete(&self) -> bool {
        self.finish_ms.is_some()
    }

    /// `true` while the job still has more than `epsilon` ms of work left.
    pub fn has_work(&self, epsilon: f64) -> bool {
        self.remaining_ms > epsilon
    }

    /// `true` iff the job has arrived by `at_ms` and still has work left.
    ///
    /// Demand at or below `epsilon` counts as done, so floating-point residue
    /// can never keep a job in the ready set forever.
    pub fn is_ready(&self, at_ms: f64, epsilon: f64) -> bool {
        self.arrival_ms <= at_ms && self.has_work(epsilon)
    }

    /// Stamp the first-dispatch time.  Later calls are no-ops.
    pub fn mark_started(&mut self, now_ms: f64) {
        if self.start_ms.is_none() {
            self.start_ms = Some(now_ms);
        }
    }

    /// Subtract `work_ms` from the remaining demand (clamped at zero).
    ///
    /// If the remaining demand ends up at or below `epsilon`, the completion
    /// time is stamped to `now_ms`.  A job that is already complete keeps its
    /// original completion time.
    pub fn apply_work(&mut self, work_ms: f64, now_ms: f64, epsilon: f64) {
        self.remaining_ms = (self.remaining_ms - work_ms.max(0.0)).max(0.0);
        if self.remaining_ms <= epsilon && self.finish_ms.is_none() {
            self.finish_ms = Some(now_ms);
        }
    }

    /// Restore the state the job had at creation time.
    pub fn reset(&mut self) {
        self.remaining_ms = self.burst_ms;
        self.start_ms = None;
        self.finish_ms = None;
    }

    /// `finish − arrival`, if the job completed.
    pub fn turnaround_ms(&self) -> Option<f64> {
        self.finish_ms.map(|f| f - self.arrival_ms)
    }

    /// `turnaround − burst`, if the job completed.
    pub fn waiting_ms(&self) -> Option<f64> {
        self.turnaround_ms().map(|t| t - self.burst_ms)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn job(arrival_ms: f64, burst_ms: f64) -> Job {
        Job::new(1, JobSpec::new(arrival_ms, burst_ms))
    }

    // ── Construction ──────────────────────────────────────────────────────────

    #[test]
    fn new_job_has_full_remaining_demand_and_no_marks() {
        let j = job(10.0, 120.0);
        assert_eq!(j.remaining_ms(), 120.0);
        assert_eq!(j.start_ms(), None);
        assert_eq!(j.finish_ms(), None);
        assert!(!j.is_complete());
    }

    #[test]
    fn job_spec_from_tuple() {
        assert_eq!(JobSpec::from((20.0, 30.0)), JobSpec::new(20.0, 30.0));
    }

    // ── is_ready ──────────────────────────────────────────────────────────────

    #[test]
    fn not_ready_before_arrival() {
        let j = job(40.0, 50.0);
        assert!(!j.is_ready(39.9, EPS));
        assert!(j.is_ready(40.0, EPS), "arrival == now counts as arrived");
    }

    #[test]
    fn residue_below_epsilon_is_not_ready() {
        let mut j = job(0.0, 10.0);
        j.apply_work(10.0 - 1e-12, 5.0, EPS);
        assert!(!j.is_ready(5.0, EPS));
        assert!(j.is_complete(), "sub-epsilon residue must count as complete");
    }

    // ── apply_work ────────────────────────────────────────────────────────────

    #[test]
    fn apply_work_clamps_at_zero() {
        let mut j = job(0.0, 10.0);
        j.apply_work(25.0, 12.5, EPS);
        assert_eq!(j.remaining_ms(), 0.0);
        assert_eq!(j.finish_ms(), Some(12.5));
    }

    #[test]
    fn partial_work_does_not_complete() {
        let mut j = job(0.0, 100.0);
        j.apply_work(40.0, 40.0, EPS);
        assert!((j.remaining_ms() - 60.0).abs() < 1e-12);
        assert!(!j.is_complete());
    }

    #[test]
    fn completion_time_is_never_restamped() {
        let mut j = job(0.0, 10.0);
        j.apply_work(10.0, 10.0, EPS);
        j.apply_work(5.0, 99.0, EPS);
        assert_eq!(j.finish_ms(), Some(10.0));
    }

    #[test]
    fn negative_work_is_ignored() {
        let mut j = job(0.0, 10.0);
        j.apply_work(-5.0, 1.0, EPS);
        assert_eq!(j.remaining_ms(), 10.0, "remaining demand must never grow");
    }

    // ── mark_started ──────────────────────────────────────────────────────────

    #[test]
    fn first_dispatch_is_fixed() {
        let mut j = job(0.0, 10.0);
        j.mark_started(3.0);
        j.mark_started(7.0);
        assert_eq!(j.start_ms(), Some(3.0));
    }

    // ── reset / statistics ────────────────────────────────────────────────────

    #[test]
    fn reset_restores_initial_state() {
        let mut j = job(5.0, 10.0);
        j.mark_started(5.0);
        j.apply_work(10.0, 15.0, EPS);
        j.reset();
        assert_eq!(j, job(5.0, 10.0));
    }

    #[test]
    fn turnaround_and_waiting() {
        let mut j = job(20.0, 30.0);
        assert_eq!(j.turnaround_ms(), None);
        j.mark_started(50.0);
        j.apply_work(30.0, 80.0, EPS);
        assert_eq!(j.turnaround_ms(), Some(60.0));
        assert_eq!(j.waiting_ms(), Some(30.0));
    }
}
