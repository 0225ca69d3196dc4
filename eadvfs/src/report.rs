/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Post-run statistics and the human-readable summary.
//!
//! A [`Report`] is a pure function of a finished [`Simulation`] and the
//! [`Engine`] that ran it; building one never touches simulation state.
//!
//! * turnaround = finish − arrival
//! * waiting    = turnaround − burst
//! * makespan   = latest finish time
//! * utilisation = busy time / makespan
//!
//! When a run stopped at the horizon, averages cover completed jobs only and
//! the summary says so.

use std::fmt;

use crate::engine::{Engine, RunOutcome, Simulation, Slice, TimelineEntry};
use crate::job::{Job, JobId};
use crate::policy::Governor;
use crate::power::energy_j;

// ── Per-job / per-level rows ──────────────────────────────────────────────────

/// Timing of one job after the run.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub id: JobId,
    pub arrival_ms: f64,
    pub burst_ms: f64,
    pub start_ms: Option<f64>,
    pub finish_ms: Option<f64>,
    pub turnaround_ms: Option<f64>,
    pub waiting_ms: Option<f64>,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            arrival_ms: job.arrival_ms,
            burst_ms: job.burst_ms,
            start_ms: job.start_ms(),
            finish_ms: job.finish_ms(),
            turnaround_ms: job.turnaround_ms(),
            waiting_ms: job.waiting_ms(),
        }
    }
}

/// Time and energy spent at one frequency level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelResidency {
    pub label: String,
    pub speed: f64,
    pub time_ms: f64,
    pub energy_j: f64,
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Summary of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub governor: Governor,
    /// `None` if the context was never executed.
    pub outcome: Option<RunOutcome>,
    pub job_count: usize,
    pub completed: usize,
    pub avg_turnaround_ms: Option<f64>,
    pub avg_waiting_ms: Option<f64>,
    pub makespan_ms: f64,
    pub energy_j: f64,
    pub busy_ms: f64,
    pub idle_ms: f64,
    pub idle_energy_j: f64,
    pub utilization_pct: f64,
    pub timeline: Vec<TimelineEntry>,
    pub residency: Vec<LevelResidency>,
    pub jobs: Vec<JobSummary>,
}

impl Report {
    pub fn from_run(engine: &Engine, sim: &Simulation) -> Self {
        let power = engine.power();
        let state = sim.state();
        let jobs: Vec<JobSummary> = sim.jobs().iter().map(JobSummary::from).collect();

        let turnarounds: Vec<f64> = jobs.iter().filter_map(|j| j.turnaround_ms).collect();
        let waits: Vec<f64> = jobs.iter().filter_map(|j| j.waiting_ms).collect();

        let makespan_ms = jobs
            .iter()
            .filter_map(|j| j.finish_ms)
            .fold(0.0_f64, f64::max);

        let utilization_pct = if makespan_ms > 0.0 {
            state.busy_ms / makespan_ms * 100.0
        } else {
            0.0
        };

        let mut residency: Vec<LevelResidency> = power
            .levels()
            .iter()
            .map(|l| LevelResidency {
                label: l.label.clone(),
                speed: l.speed,
                time_ms: 0.0,
                energy_j: 0.0,
            })
            .collect();
        let mut idle_energy_j = 0.0;

        for slice in &state.slices {
            let e = energy_j(slice.power_w(), slice.duration_ms());
            match *slice {
                Slice::Busy {
                    level, duration_ms, ..
                } => {
                    if let Some(row) = residency.get_mut(level) {
                        row.time_ms += duration_ms;
                        row.energy_j += e;
                    }
                }
                Slice::Idle { .. } => idle_energy_j += e,
            }
        }

        Self {
            governor: engine.governor(),
            outcome: sim.outcome(),
            job_count: jobs.len(),
            completed: turnarounds.len(),
            avg_turnaround_ms: mean(&turnarounds),
            avg_waiting_ms: mean(&waits),
            makespan_ms,
            energy_j: state.energy_j,
            busy_ms: state.busy_ms,
            idle_ms: state.idle_ms,
            idle_energy_j,
            utilization_pct,
            timeline: state.timeline.entries().to_vec(),
            residency,
            jobs,
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn opt_ms(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.3}")).unwrap_or_else(|| "-".to_string())
}

// ── Text rendering ────────────────────────────────────────────────────────────

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===== EADVFS Simulation Results ({}) =====", self.governor)?;

        match self.outcome {
            Some(RunOutcome::Completed) => writeln!(f, "Status: completed")?,
            Some(RunOutcome::HorizonReached {
                clock_ms,
                unfinished,
            }) => writeln!(
                f,
                "Status: stopped at horizon (clock {clock_ms:.3} ms, {unfinished} job(s) unfinished)"
            )?,
            None => writeln!(f, "Status: not executed")?,
        }

        writeln!(f, "Jobs: {} ({} completed)", self.job_count, self.completed)?;
        writeln!(f, "Avg turnaround (ms): {}", opt_ms(self.avg_turnaround_ms))?;
        writeln!(f, "Avg waiting (ms): {}", opt_ms(self.avg_waiting_ms))?;
        writeln!(f, "Makespan (ms): {:.3}", self.makespan_ms)?;
        writeln!(f, "Total energy (J): {:.3}", self.energy_j)?;
        writeln!(f, "CPU utilization (%): {:.3}", self.utilization_pct)?;
        writeln!(f)?;

        writeln!(f, "Frequency residency:")?;
        for row in &self.residency {
            writeln!(
                f,
                "  {:<10} x{:<5.2} {:>12.3} ms {:>10.4} J",
                row.label, row.speed, row.time_ms, row.energy_j
            )?;
        }
        writeln!(
            f,
            "  {:<10} {:<6} {:>12.3} ms {:>10.4} J",
            "idle", "", self.idle_ms, self.idle_energy_j
        )?;
        writeln!(f)?;

        writeln!(f, "Gantt chart (job:duration_ms):")?;
        let gantt: Vec<String> = self
            .timeline
            .iter()
            .map(|e| format!("[P{}:{:.0}ms]", e.job_id, e.duration_ms))
            .collect();
        writeln!(f, "{}", gantt.join(" "))?;
        writeln!(f)?;

        writeln!(f, "Per-job detail:")?;
        for j in &self.jobs {
            writeln!(
                f,
                "P{} arrival={:.3} burst={:.3} start={} finish={}",
                j.id,
                j.arrival_ms,
                j.burst_ms,
                opt_ms(j.start_ms),
                opt_ms(j.finish_ms)
            )?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::job::JobSpec;
    use crate::policy::PolicyConfig;
    use crate::power::PowerModel;
    use std::sync::Arc;

    fn engine(governor: Governor, config: EngineConfig) -> Engine {
        Engine::new(
            Arc::new(PowerModel::default()),
            PolicyConfig::default(),
            governor,
            config,
        )
        .unwrap()
    }

    fn specs(pairs: &[(f64, f64)]) -> Vec<JobSpec> {
        pairs.iter().copied().map(JobSpec::from).collect()
    }

    fn sample_report() -> Report {
        let e = engine(Governor::Adaptive, EngineConfig::default());
        let sim = e
            .run(&specs(&[
                (0.0, 120.0),
                (20.0, 30.0),
                (40.0, 50.0),
                (100.0, 200.0),
                (150.0, 20.0),
                (300.0, 400.0),
                (350.0, 60.0),
            ]))
            .unwrap();
        Report::from_run(&e, &sim)
    }

    // ── Statistics ────────────────────────────────────────────────────────────

    #[test]
    fn powersave_single_job_statistics() {
        // 100 ms alone at 1.0×: no waiting, 100 ms makespan, 100% busy.
        let e = engine(Governor::Powersave, EngineConfig::default());
        let sim = e.run(&specs(&[(0.0, 100.0)])).unwrap();
        let r = Report::from_run(&e, &sim);

        assert_eq!(r.job_count, 1);
        assert_eq!(r.completed, 1);
        assert!((r.makespan_ms - 100.0).abs() < 1e-9);
        assert!((r.avg_turnaround_ms.unwrap() - 100.0).abs() < 1e-9);
        assert!(r.avg_waiting_ms.unwrap().abs() < 1e-9);
        assert!((r.utilization_pct - 100.0).abs() < 1e-9);
        assert!((r.energy_j - 0.15).abs() < 1e-9);
    }

    #[test]
    fn faster_level_gives_negative_waiting() {
        // Running above reference speed finishes before `burst` ms have passed.
        let e = engine(Governor::Performance, EngineConfig::default());
        let sim = e.run(&specs(&[(0.0, 100.0)])).unwrap();
        let r = Report::from_run(&e, &sim);
        assert!((r.avg_waiting_ms.unwrap() + 50.0).abs() < 1e-9);
    }

    #[test]
    fn idle_gap_lowers_utilization() {
        let e = engine(Governor::Powersave, EngineConfig::default());
        let sim = e.run(&specs(&[(100.0, 100.0)])).unwrap();
        let r = Report::from_run(&e, &sim);
        assert!((r.makespan_ms - 200.0).abs() < 1e-9);
        assert!((r.utilization_pct - 50.0).abs() < 1e-9);
        assert!((r.idle_ms - 100.0).abs() < 1e-9);
        assert!((r.idle_energy_j - 0.02).abs() < 1e-12);
    }

    #[test]
    fn averages_match_per_job_rows() {
        let r = sample_report();
        let n = r.jobs.len() as f64;
        let tat: f64 = r.jobs.iter().map(|j| j.turnaround_ms.unwrap()).sum::<f64>() / n;
        let wait: f64 = r.jobs.iter().map(|j| j.waiting_ms.unwrap()).sum::<f64>() / n;
        assert!((r.avg_turnaround_ms.unwrap() - tat).abs() < 1e-9);
        assert!((r.avg_waiting_ms.unwrap() - wait).abs() < 1e-9);
        for j in &r.jobs {
            let expected = j.turnaround_ms.unwrap() - j.burst_ms;
            assert!((j.waiting_ms.unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn residency_accounts_for_all_time_and_energy() {
        let r = sample_report();
        let busy: f64 = r.residency.iter().map(|l| l.time_ms).sum();
        let energy: f64 = r.residency.iter().map(|l| l.energy_j).sum::<f64>() + r.idle_energy_j;
        assert!((busy - r.busy_ms).abs() < 1e-6);
        assert!((energy - r.energy_j).abs() < 1e-9);
        assert_eq!(r.residency.len(), 3);
    }

    #[test]
    fn partial_run_averages_completed_jobs_only() {
        let config = EngineConfig {
            horizon_ms: Some(100.0),
            ..Default::default()
        };
        let e = engine(Governor::Powersave, config);
        let sim = e.run(&specs(&[(0.0, 10_000.0), (0.0, 20.0)])).unwrap();
        let r = Report::from_run(&e, &sim);

        assert_eq!(r.completed, 1);
        assert!((r.avg_turnaround_ms.unwrap() - 20.0).abs() < 1e-9);
        assert!((r.makespan_ms - 20.0).abs() < 1e-9);
        assert!(matches!(r.outcome, Some(RunOutcome::HorizonReached { .. })));
        assert_eq!(r.jobs[0].finish_ms, None);
    }

    #[test]
    fn unexecuted_context_reports_nothing() {
        let e = engine(Governor::Adaptive, EngineConfig::default());
        let sim = Simulation::new(&specs(&[(0.0, 10.0)])).unwrap();
        let r = Report::from_run(&e, &sim);
        assert_eq!(r.outcome, None);
        assert_eq!(r.completed, 0);
        assert_eq!(r.avg_turnaround_ms, None);
        assert_eq!(r.utilization_pct, 0.0);
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    #[test]
    fn summary_contains_every_section() {
        let text = sample_report().to_string();
        for needle in [
            "EADVFS Simulation Results (eadvfs)",
            "Status: completed",
            "Jobs: 7 (7 completed)",
            "Avg turnaround (ms):",
            "Avg waiting (ms):",
            "Makespan (ms):",
            "Total energy (J):",
            "CPU utilization (%):",
            "Frequency residency:",
            "Gantt chart (job:duration_ms):",
            "[P1:",
            "Per-job detail:",
            "P7 arrival=350.000 burst=60.000",
        ] {
            assert!(text.contains(needle), "missing '{needle}' in:\n{text}");
        }
    }

    #[test]
    fn horizon_stop_is_visible_in_summary() {
        let config = EngineConfig {
            horizon_ms: Some(100.0),
            ..Default::default()
        };
        let e = engine(Governor::Powersave, config);
        let sim = e.run(&specs(&[(0.0, 10_000.0)])).unwrap();
        let text = Report::from_run(&e, &sim).to_string();
        assert!(text.contains("stopped at horizon"));
        assert!(text.contains("1 job(s) unfinished"));
        assert!(text.contains("finish=-"));
    }

    #[test]
    fn gantt_rounds_durations() {
        let e = engine(Governor::Powersave, EngineConfig::default());
        let sim = e.run(&specs(&[(0.0, 30.2), (0.0, 40.0)])).unwrap();
        let text = Report::from_run(&e, &sim).to_string();
        assert!(text.contains("[P1:30ms] [P2:40ms]"), "{text}");
    }
}
