//! Profiling executor: times each pipeline phase, writes the stats as JSON
//! and prints the slowest phases once the command is done.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;

use super::{run_pipeline, Executor, PhaseRecorder};
use crate::cli::ArgumentParser;
use crate::command::CommandDescriptor;
use crate::config::config::DEFAULT_PROFILE_TOP_N;

/// Suffix of the stats file written next to other profiles
pub const STATS_SUFFIX: &str = ".prof.json";

/// Accumulated time for one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseStat {
    pub phase: String,
    pub calls: u32,
    pub cumulative_us: u64,
}

/// Collects phase durations in first-seen order.
#[derive(Debug, Default)]
pub struct PhaseTimings {
    phases: Vec<PhaseStat>,
}

impl PhaseRecorder for PhaseTimings {
    fn record(&mut self, phase: &str, elapsed: Duration) {
        let micros = elapsed.as_micros() as u64;
        match self.phases.iter_mut().find(|p| p.phase == phase) {
            Some(stat) => {
                stat.calls += 1;
                stat.cumulative_us += micros;
            }
            None => self.phases.push(PhaseStat {
                phase: phase.to_string(),
                calls: 1,
                cumulative_us: micros,
            }),
        }
    }
}

impl PhaseTimings {
    pub fn into_report(
        self,
        command: &str,
        started_at: DateTime<Utc>,
        total: Duration,
        exit_status: i32,
    ) -> ProfileReport {
        ProfileReport {
            command: command.to_string(),
            started_at,
            exit_status,
            total_us: total.as_micros() as u64,
            phases: self.phases,
        }
    }
}

/// Contents of `<command>.prof.json`
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub command: String,
    pub started_at: DateTime<Utc>,
    pub exit_status: i32,
    pub total_us: u64,
    pub phases: Vec<PhaseStat>,
}

impl ProfileReport {
    /// Phases by cumulative time, slowest first. Ties keep pipeline order.
    pub fn sorted(&self) -> Vec<&PhaseStat> {
        let mut phases: Vec<&PhaseStat> = self.phases.iter().collect();
        phases.sort_by(|a, b| b.cumulative_us.cmp(&a.cumulative_us));
        phases
    }

    /// Human-readable table of the `top_n` slowest phases.
    pub fn summary(&self, top_n: usize) -> String {
        let mut text = format!(
            "\nProfile of '{}': {} phases, {} total (top {} by cumulative time)\n",
            self.command,
            self.phases.len(),
            millis(self.total_us),
            top_n
        );
        text.push_str(&format!("{:>8}  {:>12}  {}\n", "calls", "cumulative", "phase"));
        for stat in self.sorted().into_iter().take(top_n) {
            text.push_str(&format!(
                "{:>8}  {:>12}  {}\n",
                stat.calls,
                millis(stat.cumulative_us),
                stat.phase
            ));
        }
        text
    }

    /// Write the report as pretty JSON into `dir`, returning the file path.
    pub fn write_to(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create profile directory: {}", dir.display()))?;
        let path = dir.join(format!("{}{}", self.command, STATS_SUFFIX));
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write profile stats: {}", path.display()))?;
        Ok(path)
    }
}

fn millis(micros: u64) -> String {
    format!("{:.3} ms", micros as f64 / 1000.0)
}

/// Wraps the pipeline with phase timing.
#[derive(Debug, Clone)]
pub struct ProfilingExecutor {
    output_dir: PathBuf,
    top_n: usize,
}

impl ProfilingExecutor {
    pub fn new(output_dir: PathBuf, top_n: usize) -> Self {
        Self { output_dir, top_n }
    }
}

impl Default for ProfilingExecutor {
    fn default() -> Self {
        Self::new(PathBuf::from("."), DEFAULT_PROFILE_TOP_N)
    }
}

impl Executor for ProfilingExecutor {
    fn execute(
        &self,
        descriptor: &CommandDescriptor,
        parser: &ArgumentParser<'_>,
        args: &[String],
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> i32 {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut timings = PhaseTimings::default();

        let status = run_pipeline(descriptor, parser, args, out, err, &mut timings);

        let report = timings.into_report(&descriptor.name, started_at, start.elapsed(), status);
        match report.write_to(&self.output_dir) {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "wrote profile stats");
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not write profile stats");
                let _ = writeln!(err, "{} {:#}", "Warning:".yellow().bold(), e);
            }
        }
        let _ = out.write_all(report.summary(self.top_n).as_bytes());

        status
    }
}
