//! Command execution strategies.
//!
//! Every executor runs the same pipeline:
//!
//! 1. parse the arguments with the command's [`ArgumentParser`]
//! 2. apply input handlers
//! 3. construct the command from its descriptor
//! 4. run it
//! 5. apply output handlers in declaration order
//!
//! [`DirectExecutor`] just runs it; [`ProfilingExecutor`] also times each
//! phase and reports on it afterwards.

#[cfg(feature = "profiling")]
pub mod profiling;

#[cfg(test)]
mod tests;

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;

use crate::cli::{ArgumentParser, EarlyExit};
use crate::command::{CommandDescriptor, HandlerError, Value};
use crate::config::ProfilingConfig;

#[cfg(feature = "profiling")]
pub use profiling::{PhaseStat, PhaseTimings, ProfileReport, ProfilingExecutor};

/// Status reported when a command fails instead of returning a status.
pub const EXIT_FAILURE: i32 = 1;

pub const PHASE_PARSE: &str = "parse_arguments";
pub const PHASE_CONSTRUCT: &str = "construct_command";
pub const PHASE_RUN: &str = "run_command";

/// Runs one resolved command and reports its exit status.
pub trait Executor {
    fn execute(
        &self,
        descriptor: &CommandDescriptor,
        parser: &ArgumentParser<'_>,
        args: &[String],
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> i32;
}

/// Receives the duration of each pipeline phase.
pub trait PhaseRecorder {
    fn record(&mut self, phase: &str, elapsed: Duration);
}

struct Discard;

impl PhaseRecorder for Discard {
    fn record(&mut self, _phase: &str, _elapsed: Duration) {}
}

/// Runs the pipeline with no instrumentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectExecutor;

impl Executor for DirectExecutor {
    fn execute(
        &self,
        descriptor: &CommandDescriptor,
        parser: &ArgumentParser<'_>,
        args: &[String],
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> i32 {
        run_pipeline(descriptor, parser, args, out, err, &mut Discard)
    }
}

/// Pick the executor once at startup.
pub fn executor_for(profiling: &ProfilingConfig) -> Box<dyn Executor> {
    if profiling.enabled {
        profiling_executor(profiling)
    } else {
        Box::new(DirectExecutor)
    }
}

#[cfg(feature = "profiling")]
fn profiling_executor(profiling: &ProfilingConfig) -> Box<dyn Executor> {
    Box::new(ProfilingExecutor::new(
        profiling.output_dir.clone(),
        profiling.top_n,
    ))
}

#[cfg(not(feature = "profiling"))]
fn profiling_executor(_profiling: &ProfilingConfig) -> Box<dyn Executor> {
    tracing::warn!("profiling requested but the `profiling` feature is not enabled");
    Box::new(DirectExecutor)
}

enum Stop {
    Early(EarlyExit),
    Failed(anyhow::Error),
}

impl From<EarlyExit> for Stop {
    fn from(exit: EarlyExit) -> Self {
        Stop::Early(exit)
    }
}

impl From<anyhow::Error> for Stop {
    fn from(e: anyhow::Error) -> Self {
        Stop::Failed(e)
    }
}

impl From<HandlerError> for Stop {
    fn from(e: HandlerError) -> Self {
        Stop::Failed(e.into())
    }
}

/// Run the shared pipeline, reporting each phase to `recorder`.
///
/// Help and usage errors from the parser exit with the parser's code. A
/// command or handler error prints `Error: <message>` and yields
/// [`EXIT_FAILURE`]. Otherwise the command's own status comes back unchanged.
pub fn run_pipeline(
    descriptor: &CommandDescriptor,
    parser: &ArgumentParser<'_>,
    args: &[String],
    out: &mut dyn Write,
    err: &mut dyn Write,
    recorder: &mut dyn PhaseRecorder,
) -> i32 {
    match pipeline(descriptor, parser, args, out, recorder) {
        Ok(status) => status,
        Err(Stop::Early(exit)) => {
            if exit.to_stderr {
                let _ = err.write_all(exit.message.as_bytes());
            } else {
                let _ = out.write_all(exit.message.as_bytes());
            }
            exit.code
        }
        Err(Stop::Failed(e)) => {
            tracing::debug!(command = %descriptor.name, error = %e, "command failed");
            let _ = writeln!(err, "{} {:#}", "Error:".red().bold(), e);
            EXIT_FAILURE
        }
    }
}

fn pipeline(
    descriptor: &CommandDescriptor,
    parser: &ArgumentParser<'_>,
    args: &[String],
    out: &mut dyn Write,
    recorder: &mut dyn PhaseRecorder,
) -> Result<i32, Stop> {
    let mut inputs = timed(recorder, PHASE_PARSE, || parser.parse(args))?;

    for input in &descriptor.inputs {
        let Some(handler) = input.handler else {
            continue;
        };
        let Some(value) = inputs.remove(&input.name) else {
            continue;
        };
        let phase = format!("input_handler:{}", input.name);
        let value = timed(recorder, &phase, || handler.apply(&input.name, value))?;
        inputs.insert(input.name.clone(), value);
    }

    let command = timed(recorder, PHASE_CONSTRUCT, || descriptor.construct())
        .with_context(|| format!("failed to construct command '{}'", descriptor.name))?;

    let outcome = timed(recorder, PHASE_RUN, || command.run(&inputs))?;

    for output in &descriptor.outputs {
        let destination = output
            .option
            .as_deref()
            .and_then(|option| descriptor.input(option))
            .and_then(|input| inputs.get(&input.name))
            .and_then(Value::as_path);
        if output.handler.requires_option() && destination.is_none() {
            tracing::debug!(output = %output.name, "no destination given, skipping");
            continue;
        }

        let value = outcome
            .results
            .get(&output.name)
            .ok_or_else(|| HandlerError::MissingResult(output.name.clone()))?;

        let phase = format!("output_handler:{}", output.name);
        timed(recorder, &phase, || {
            output
                .handler
                .emit(&output.name, value, destination.as_deref(), &mut *out)
        })?;
    }

    Ok(outcome.status)
}

fn timed<T>(recorder: &mut dyn PhaseRecorder, phase: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    recorder.record(phase, start.elapsed());
    result
}
