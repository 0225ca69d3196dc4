/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Workload input: the built-in sample jobset and plain-text job files.
//!
//! The file format is one job per line:
//!
//! ```text
//! # arrival_ms  burst_ms
//! 0     120
//! 20    30
//! ```
//!
//! Blank lines and `#` comments are skipped.  Anything else that does not
//! parse as two numbers is a hard error naming the file and line.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::job::JobSpec;

/// Mixed jobset used when no workload file is given.
pub fn sample_workload() -> Vec<JobSpec> {
    [
        (0.0, 120.0),
        (20.0, 30.0),
        (40.0, 50.0),
        (100.0, 200.0),
        (150.0, 20.0),
        (300.0, 400.0),
        (350.0, 60.0),
    ]
    .into_iter()
    .map(JobSpec::from)
    .collect()
}

/// Parse workload text.  `source` is only used in error messages.
pub fn parse_workload(content: &str, source: &str) -> Result<Vec<JobSpec>> {
    let mut jobs = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            bail!(
                "{source}:{line_no}: expected 'arrival_ms burst_ms', found {} field(s): '{line}'",
                fields.len()
            );
        }

        let arrival_ms: f64 = fields[0]
            .parse()
            .with_context(|| format!("{source}:{line_no}: invalid arrival '{}'", fields[0]))?;
        let burst_ms: f64 = fields[1]
            .parse()
            .with_context(|| format!("{source}:{line_no}: invalid burst '{}'", fields[1]))?;

        debug!(line = line_no, arrival_ms, burst_ms, "workload entry");
        jobs.push(JobSpec::new(arrival_ms, burst_ms));
    }

    if jobs.is_empty() {
        bail!("{source}: workload contains no jobs");
    }
    Ok(jobs)
}

/// Read and parse a workload file.
///
/// # Errors
/// Returns an error if the file cannot be read, a line is malformed, or the
/// file holds no jobs.
pub fn load_workload(path: &Path) -> Result<Vec<JobSpec>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open workload file: {}", path.display()))?;
    let jobs = parse_workload(&content, &path.display().to_string())?;
    info!(path = %path.display(), jobs = jobs.len(), "workload loaded");
    Ok(jobs)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn workload_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn sample_workload_has_seven_jobs() {
        let w = sample_workload();
        assert_eq!(w.len(), 7);
        assert_eq!(w[0], JobSpec::new(0.0, 120.0));
        assert_eq!(w[6], JobSpec::new(350.0, 60.0));
    }

    #[test]
    fn parses_pairs_comments_and_blank_lines() {
        let text = "# arrival burst\n0 120\n\n20\t30   # short job\n  40 50.5\n";
        let jobs = parse_workload(text, "inline").unwrap();
        assert_eq!(
            jobs,
            vec![
                JobSpec::new(0.0, 120.0),
                JobSpec::new(20.0, 30.0),
                JobSpec::new(40.0, 50.5),
            ]
        );
    }

    #[test]
    fn malformed_number_reports_line() {
        let err = parse_workload("0 10\n5 abc\n", "jobs.txt").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("jobs.txt:2"), "got: {msg}");
        assert!(msg.contains("burst"), "got: {msg}");
    }

    #[test]
    fn wrong_field_count_is_an_error() {
        let err = parse_workload("0 10 99\n", "jobs.txt").unwrap_err();
        assert!(format!("{err}").contains("3 field(s)"));
    }

    #[test]
    fn empty_workload_is_an_error() {
        assert!(parse_workload("# nothing here\n\n", "empty.txt").is_err());
    }

    #[test]
    fn load_from_file() {
        let f = workload_tempfile("0 100\n300 50\n");
        let jobs = load_workload(f.path()).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1], JobSpec::new(300.0, 50.0));
    }

    #[test]
    fn missing_file_returns_error() {
        let err = load_workload(Path::new("/nonexistent/path/jobs.txt")).unwrap_err();
        assert!(format!("{err}").contains("Cannot open workload file"));
    }
}
