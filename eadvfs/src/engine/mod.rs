/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Discrete-event simulation engine.
//!
//! [`Engine`] holds the read-only configuration (power model, policy
//! thresholds, governor, engine parameters).  Every run gets its own
//! [`Simulation`] context that owns the job collection and the
//! [`SimState`]; the engine mutates it only inside [`Engine::execute`].
//!
//! One iteration of the loop:
//!
//! ```text
//! ready set empty? ── no future arrival ──► done
//!        │         └─ future arrival ────► accrue idle energy, jump clock
//!        ▼
//! governor → level, SRTF → job
//!        ▼
//! plan_run: min(completion, next arrival, clock + quantum)
//!        ▼
//! degenerate? ──► advance clock, retry
//!        ▼
//! apply work, accrue energy + busy time, log timeline, advance clock
//! ```
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | Shared config | `Arc<PowerModel>` + `Copy` policy/engine params — `Engine` is `Send + Sync` |
//! | Per-run state | [`Simulation`] context, reset at the start of every `execute` |
//! | Interval length | one authoritative [`RunInterval`] from [`interval::plan_run`] |
//! | Non-termination | optional horizon, reported as [`RunOutcome::HorizonReached`] |

pub mod error;
pub mod interval;

pub use error::{JobRejection, SimError};
pub use interval::{IntervalLimit, RunInterval};

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::job::{Job, JobId, JobSpec};
use crate::policy::{select_job, Governor, PolicyConfig};
use crate::power::{energy_j, PowerModel};

use interval::{next_arrival_after, plan_run};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Window used by the frequency heuristic to estimate load.
pub const DEFAULT_LOOKAHEAD_MS: f64 = 200.0;

/// Longest single run slice before the policy is consulted again.
pub const DEFAULT_QUANTUM_MS: f64 = 50.0;

/// Demand at or below this is treated as complete.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Safety-valve horizon for the simulated clock.
pub const DEFAULT_HORIZON_MS: f64 = 100_000.0;

// ── EngineConfig ──────────────────────────────────────────────────────────────

/// Loop parameters of the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub lookahead_ms: f64,
    pub quantum_ms: f64,
    pub epsilon: f64,
    /// `None` disables the horizon check.
    pub horizon_ms: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookahead_ms: DEFAULT_LOOKAHEAD_MS,
            quantum_ms: DEFAULT_QUANTUM_MS,
            epsilon: DEFAULT_EPSILON,
            horizon_ms: Some(DEFAULT_HORIZON_MS),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        let check = |name: &'static str, value: f64, ok: bool| {
            if value.is_finite() && ok {
                Ok(())
            } else {
                Err(SimError::InvalidParameter { name, value })
            }
        };

        check("lookahead_ms", self.lookahead_ms, self.lookahead_ms >= 0.0)?;
        check("quantum_ms", self.quantum_ms, self.quantum_ms > 0.0)?;
        check("epsilon", self.epsilon, self.epsilon >= 0.0)?;
        if let Some(h) = self.horizon_ms {
            check("horizon_ms", h, h > 0.0)?;
        }
        Ok(())
    }
}

// ── Timeline ──────────────────────────────────────────────────────────────────

/// One merged Gantt entry: a job and how long it ran back-to-back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineEntry {
    pub job_id: JobId,
    pub duration_ms: f64,
}

/// Append-only Gantt log.  Consecutive entries for the same job are merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn push(&mut self, job_id: JobId, duration_ms: f64) {
        match self.entries.last_mut() {
            Some(last) if last.job_id == job_id => last.duration_ms += duration_ms,
            _ => self.entries.push(TimelineEntry {
                job_id,
                duration_ms,
            }),
        }
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Slice trace ───────────────────────────────────────────────────────────────

/// Unmerged record of one busy or idle interval, with the level that was used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slice {
    Busy {
        job_id: JobId,
        level: usize,
        power_w: f64,
        start_ms: f64,
        duration_ms: f64,
    },
    Idle {
        power_w: f64,
        start_ms: f64,
        duration_ms: f64,
    },
}

impl Slice {
    pub fn start_ms(&self) -> f64 {
        match *self {
            Slice::Busy { start_ms, .. } | Slice::Idle { start_ms, .. } => start_ms,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        match *self {
            Slice::Busy { duration_ms, .. } | Slice::Idle { duration_ms, .. } => duration_ms,
        }
    }

    /// Power drawn during this slice, as recorded when it ran.
    pub fn power_w(&self) -> f64 {
        match *self {
            Slice::Busy { power_w, .. } | Slice::Idle { power_w, .. } => power_w,
        }
    }
}

// ── SimState ──────────────────────────────────────────────────────────────────

/// Clock, accumulators and logs of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimState {
    /// Simulated time in ms.  Never decreases.
    pub clock_ms: f64,
    /// Energy consumed so far in Joules.  Never decreases.
    pub energy_j: f64,
    /// Time spent running jobs.
    pub busy_ms: f64,
    /// Time spent idle between arrivals.
    pub idle_ms: f64,
    /// Merged Gantt log.
    pub timeline: Timeline,
    /// Every busy/idle slice, unmerged.
    pub slices: Vec<Slice>,
    /// Zero-length intervals skipped by the degenerate-step guard.
    pub degenerate_steps: u64,
}

impl SimState {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn record_busy(&mut self, job_id: JobId, level: usize, power_w: f64, interval: &RunInterval) {
        let duration_ms = interval.duration_ms();
        self.energy_j += energy_j(power_w, duration_ms);
        self.busy_ms += duration_ms;
        self.timeline.push(job_id, duration_ms);
        self.slices.push(Slice::Busy {
            job_id,
            level,
            power_w,
            start_ms: interval.start_ms,
            duration_ms,
        });
        self.clock_ms = interval.end_ms;
    }

    fn record_idle(&mut self, until_ms: f64, idle_power_w: f64) {
        let start_ms = self.clock_ms;
        let duration_ms = until_ms - start_ms;
        self.energy_j += energy_j(idle_power_w, duration_ms);
        self.idle_ms += duration_ms;
        self.slices.push(Slice::Idle {
            power_w: idle_power_w,
            start_ms,
            duration_ms,
        });
        self.clock_ms = until_ms;
    }
}

// ── RunOutcome ────────────────────────────────────────────────────────────────

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunOutcome {
    /// Every job's demand was satisfied.
    Completed,
    /// The clock passed the horizon with work still outstanding.
    HorizonReached { clock_ms: f64, unfinished: usize },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }
}

// ── Simulation (per-run context) ──────────────────────────────────────────────

/// Per-run context: the job collection, the state, and the outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    jobs: Vec<Job>,
    state: SimState,
    outcome: Option<RunOutcome>,
}

impl Simulation {
    /// Build a run context from a workload.  Jobs get ids `1..=n` in input
    /// order.
    ///
    /// # Errors
    /// * [`SimError::NoJobs`] for an empty workload.
    /// * [`SimError::InvalidJob`] for a negative/non-finite arrival or a
    ///   non-positive/non-finite burst.
    pub fn new(specs: &[JobSpec]) -> Result<Self, SimError> {
        if specs.is_empty() {
            return Err(SimError::NoJobs);
        }

        let mut jobs = Vec::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            let id = i as JobId + 1;
            if !spec.arrival_ms.is_finite() || spec.arrival_ms < 0.0 {
                return Err(SimError::InvalidJob {
                    id,
                    reason: JobRejection::InvalidArrival(spec.arrival_ms),
                });
            }
            if !spec.burst_ms.is_finite() || spec.burst_ms <= 0.0 {
                return Err(SimError::InvalidJob {
                    id,
                    reason: JobRejection::InvalidBurst(spec.burst_ms),
                });
            }
            jobs.push(Job::new(id, *spec));
        }

        Ok(Self {
            jobs,
            state: SimState::default(),
            outcome: None,
        })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// `None` until [`Engine::execute`] has run on this context.
    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    fn unfinished(&self, epsilon: f64) -> usize {
        self.jobs.iter().filter(|j| j.has_work(epsilon)).count()
    }

    fn reset(&mut self) {
        for job in &mut self.jobs {
            job.reset();
        }
        self.state.reset();
        self.outcome = None;
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// What one loop iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Ran,
    Idled,
    Degenerate,
    Finished,
}

/// The simulation engine: read-only configuration plus the event loop.
#[derive(Debug, Clone)]
pub struct Engine {
    power: Arc<PowerModel>,
    policy: PolicyConfig,
    governor: Governor,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine, validating the policy thresholds and loop
    /// parameters.  The power model is already validated by construction.
    pub fn new(
        power: Arc<PowerModel>,
        policy: PolicyConfig,
        governor: Governor,
        config: EngineConfig,
    ) -> Result<Self, SimError> {
        policy.validate()?;
        config.validate()?;
        if governor == Governor::Adaptive && !power.has_distinct_medium() {
            warn!(
                levels = power.levels().len(),
                "power table has no medium level, medium requests run at the lowest level"
            );
        }
        Ok(Self {
            power,
            policy,
            governor,
            config,
        })
    }

    pub fn power(&self) -> &PowerModel {
        &self.power
    }

    pub fn governor(&self) -> Governor {
        self.governor
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build a fresh context for `specs` and run it to the end.
    pub fn run(&self, specs: &[JobSpec]) -> Result<Simulation, SimError> {
        let mut sim = Simulation::new(specs)?;
        self.execute(&mut sim);
        Ok(sim)
    }

    /// Run `sim` from a clean state until every job completes or the horizon
    /// is passed.  Running the same context twice gives identical results.
    pub fn execute(&self, sim: &mut Simulation) -> RunOutcome {
        sim.reset();
        let eps = self.config.epsilon;

        info!(
            jobs = sim.jobs.len(),
            governor = %self.governor,
            levels = self.power.levels().len(),
            quantum_ms = self.config.quantum_ms,
            horizon_ms = ?self.config.horizon_ms,
            "=== simulation started ==="
        );

        let outcome = loop {
            if let Some(horizon) = self.config.horizon_ms {
                if sim.state.clock_ms > horizon {
                    let unfinished = sim.unfinished(eps);
                    if unfinished > 0 {
                        warn!(
                            clock_ms = sim.state.clock_ms,
                            horizon_ms = horizon,
                            unfinished,
                            "horizon exceeded — stopping with partial results"
                        );
                        break RunOutcome::HorizonReached {
                            clock_ms: sim.state.clock_ms,
                            unfinished,
                        };
                    }
                }
            }

            if self.step(sim) == Step::Finished {
                break RunOutcome::Completed;
            }
        };

        sim.outcome = Some(outcome);

        info!(
            clock_ms = sim.state.clock_ms,
            energy_j = sim.state.energy_j,
            busy_ms = sim.state.busy_ms,
            segments = sim.state.timeline.len(),
            ?outcome,
            "=== simulation finished ==="
        );

        outcome
    }

    /// One iteration of the event loop.
    fn step(&self, sim: &mut Simulation) -> Step {
        let eps = self.config.epsilon;
        let now = sim.state.clock_ms;

        // Ready set in job order, so SRTF ties go to the lowest id.
        let ready: Vec<usize> = sim
            .jobs
            .iter()
            .enumerate()
            .filter(|(_, j)| j.is_ready(now, eps))
            .map(|(i, _)| i)
            .collect();
        let next_arrival = next_arrival_after(&sim.jobs, now);

        if ready.is_empty() {
            return match next_arrival {
                None => Step::Finished,
                Some(arrival) => {
                    debug!(from_ms = now, until_ms = arrival, "idle until next arrival");
                    sim.state.record_idle(arrival, self.power.idle_power_w());
                    Step::Idled
                }
            };
        }

        let (level_idx, job_idx) = {
            let ready_jobs: Vec<&Job> = ready.iter().map(|&i| &sim.jobs[i]).collect();
            let level_idx = self
                .governor
                .select_frequency(&ready_jobs, &self.policy, self.config.lookahead_ms)
                .map(|sel| self.power.resolve(sel))
                .unwrap_or(0);
            let pick = select_job(&ready_jobs).unwrap_or(0);
            (level_idx, ready[pick])
        };

        let levels = self.power.levels();
        let level = &levels[level_idx.min(levels.len() - 1)];
        let job = &mut sim.jobs[job_idx];

        let mut run = plan_run(
            now,
            job.remaining_ms(),
            level.speed,
            next_arrival,
            self.config.quantum_ms,
        );

        if run.is_degenerate() && run.limit == IntervalLimit::Quantum {
            // The quantum vanishes at this clock magnitude.  Run uncapped up
            // to completion or the next arrival instead.
            sim.state.degenerate_steps += 1;
            trace!(job = job.id, clock_ms = now, "quantum below clock resolution");
            run = plan_run(
                now,
                job.remaining_ms(),
                level.speed,
                next_arrival,
                f64::INFINITY,
            );
        }

        if run.is_degenerate() {
            // The interval collapsed below clock resolution.  A collapsed
            // completion means the residue is too small to ever schedule, so
            // it is retired here; otherwise the loop would spin.
            sim.state.degenerate_steps += 1;
            sim.state.clock_ms = now.max(run.end_ms);
            if run.limit == IntervalLimit::Completion {
                let residue = job.remaining_ms();
                job.mark_started(sim.state.clock_ms);
                job.apply_work(residue, sim.state.clock_ms, eps);
            }
            trace!(job = job.id, limit = ?run.limit, "degenerate interval skipped");
            return Step::Degenerate;
        }

        job.mark_started(now);
        let was_complete = job.is_complete();
        let duration_ms = run.duration_ms();
        job.apply_work(duration_ms * level.speed, run.end_ms, eps);

        debug!(
            job = job.id,
            level = %level.label,
            start_ms = now,
            duration_ms,
            limit = ?run.limit,
            remaining_ms = job.remaining_ms(),
            "dispatched"
        );
        if !was_complete && job.is_complete() {
            debug!(job = job.id, finish_ms = run.end_ms, "job completed");
        }

        let job_id = job.id;
        sim.state.record_busy(job_id, level_idx, level.power_w, &run);
        Step::Ran
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
