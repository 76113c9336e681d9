use super::*;
use crate::command::{Command, CommandOutcome, ConstructorTable, Inputs, Settings};
use anyhow::bail;
use tempfile::tempdir;

struct Failing;

impl Command for Failing {
    fn run(&self, _inputs: &Inputs) -> anyhow::Result<CommandOutcome> {
        bail!("disk on fire")
    }
}

struct ExitsWith(i32);

impl Command for ExitsWith {
    fn run(&self, inputs: &Inputs) -> anyhow::Result<CommandOutcome> {
        Ok(CommandOutcome::with_status(inputs.clone(), self.0))
    }
}

fn table() -> ConstructorTable {
    ConstructorTable::builtin()
        .register("fail", |_: &Settings| Ok(Box::new(Failing) as Box<dyn Command>))
        .register("exit3", |_: &Settings| {
            Ok(Box::new(ExitsWith(3)) as Box<dyn Command>)
        })
        .register("no_results", |_: &Settings| {
            Ok(Box::new(ExitsWith(0)) as Box<dyn Command>)
        })
}

fn descriptor(toml: &str) -> CommandDescriptor {
    CommandDescriptor::from_toml_str("alpha", toml, &table()).unwrap()
}

fn execute(executor: &dyn Executor, descriptor: &CommandDescriptor, args: &[&str]) -> (i32, String, String) {
    let parser = ArgumentParser::build(descriptor, "mytool alpha");
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = executor.execute(descriptor, &parser, &args, &mut out, &mut err);
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

const ECHO: &str = r#"
    constructor = "echo"
    description = "Echo a word"
    [[usage_examples]]
    example = "%prog --word hi"
    [[inputs]]
    name = "word"
    required = true
    [[inputs]]
    name = "tags"
    handler = "split_comma"
    [[inputs]]
    name = "output_fp"
    type = "new_filepath"
    [[outputs]]
    name = "word"
    handler = "print_string"
    [[outputs]]
    name = "tags"
    handler = "write_list_of_strings"
    option = "output_fp"
"#;

#[test]
fn test_direct_pipeline_prints_outputs() {
    let descriptor = descriptor(ECHO);
    let (code, out, err) = execute(
        &DirectExecutor,
        &descriptor,
        &["--word", "hello", "--tags", "x"],
    );
    assert_eq!(code, 0, "stderr: {}", err);
    assert_eq!(out, "hello\n");
}

#[test]
fn test_write_handler_uses_bound_option() {
    let temp = tempdir().unwrap();
    let target = temp.path().join("tags.txt");
    let descriptor = descriptor(ECHO);

    let (code, _, err) = execute(
        &DirectExecutor,
        &descriptor,
        &[
            "--word",
            "hi",
            "--tags",
            "a, b,c",
            "--output-fp",
            &target.to_string_lossy(),
        ],
    );
    assert_eq!(code, 0, "stderr: {}", err);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "a\nb\nc\n");

    // existing destinations are refused
    let (code, _, err) = execute(
        &DirectExecutor,
        &descriptor,
        &[
            "--word",
            "hi",
            "--tags",
            "a",
            "--output-fp",
            &target.to_string_lossy(),
        ],
    );
    assert_eq!(code, EXIT_FAILURE);
    assert!(err.contains("already exists"));
}

#[test]
fn test_usage_error_goes_to_stderr_with_code_2() {
    let descriptor = descriptor(ECHO);
    let (code, out, err) = execute(&DirectExecutor, &descriptor, &["--bogus"]);
    assert_eq!(code, 2);
    assert!(out.is_empty());
    assert!(err.contains("--bogus"));
}

#[test]
fn test_help_goes_to_stdout_with_code_0() {
    let descriptor = descriptor(ECHO);
    let (code, out, _) = execute(&DirectExecutor, &descriptor, &["-h"]);
    assert_eq!(code, 0);
    assert!(out.contains("Echo a word"));
}

#[test]
fn test_command_status_passes_through() {
    let descriptor = descriptor(&ECHO.replace("constructor = \"echo\"", "constructor = \"exit3\""));
    let (code, out, _) = execute(&DirectExecutor, &descriptor, &["--word", "x"]);
    assert_eq!(code, 3);
    assert_eq!(out, "x\n");
}

#[test]
fn test_command_error_is_reported() {
    let descriptor = descriptor(&ECHO.replace("constructor = \"echo\"", "constructor = \"fail\""));
    let (code, out, err) = execute(&DirectExecutor, &descriptor, &["--word", "x"]);
    assert_eq!(code, EXIT_FAILURE);
    assert!(out.is_empty());
    assert!(err.contains("Error:"));
    assert!(err.contains("disk on fire"));
}

#[test]
fn test_missing_result_is_an_error() {
    let toml = r#"
        constructor = "no_results"
        description = "d"
        [[usage_examples]]
        example = "%prog"
        [[outputs]]
        name = "report"
        handler = "print_string"
    "#;
    let descriptor = descriptor(toml);
    let (code, _, err) = execute(&DirectExecutor, &descriptor, &[]);
    assert_eq!(code, EXIT_FAILURE);
    assert!(err.contains("report"));
}

#[test]
fn test_executor_for_disabled_profiling() {
    let config = ProfilingConfig::default();
    let executor = executor_for(&config);
    let descriptor = descriptor(ECHO);
    let (code, out, _) = execute(executor.as_ref(), &descriptor, &["--word", "x"]);
    assert_eq!(code, 0);
    assert_eq!(out, "x\n");
}

#[cfg(feature = "profiling")]
mod profiling_tests {
    use super::*;

    #[test]
    fn test_profiling_keeps_status_and_output() {
        let temp = tempdir().unwrap();
        let executor = ProfilingExecutor::new(temp.path().to_path_buf(), 25);
        let descriptor =
            descriptor(&ECHO.replace("constructor = \"echo\"", "constructor = \"exit3\""));

        let (code, out, _) = execute(&executor, &descriptor, &["--word", "x"]);
        assert_eq!(code, 3);
        assert!(out.starts_with("x\n"));
        assert!(out.contains("Profile of 'alpha'"));
        assert!(out.contains(PHASE_RUN));

        let stats = temp.path().join("alpha.prof.json");
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(stats).unwrap()).unwrap();
        assert_eq!(json["command"], "alpha");
        assert_eq!(json["exit_status"], 3);
        assert!(json["phases"].as_array().unwrap().len() >= 3);
    }

    #[test]
    fn test_summary_is_sorted_and_limited() {
        let mut timings = PhaseTimings::default();
        timings.record("fast", Duration::from_micros(10));
        timings.record("slow", Duration::from_micros(500));
        timings.record("fast", Duration::from_micros(15));
        timings.record("medium", Duration::from_micros(100));

        let report = timings.into_report("alpha", chrono::Utc::now(), Duration::from_micros(700), 0);
        let sorted: Vec<&str> = report.sorted().into_iter().map(|s| s.phase.as_str()).collect();
        assert_eq!(sorted, vec!["slow", "medium", "fast"]);
        assert_eq!(report.phases[0].calls, 2);
        assert_eq!(report.phases[0].cumulative_us, 25);

        let summary = report.summary(2);
        assert!(summary.contains("slow"));
        assert!(summary.contains("medium"));
        assert!(!summary.contains("fast"));
    }

    #[test]
    fn test_selected_when_enabled() {
        let temp = tempdir().unwrap();
        let config = ProfilingConfig {
            enabled: true,
            output_dir: temp.path().to_path_buf(),
            top_n: 5,
        };
        let executor = executor_for(&config);
        let descriptor = descriptor(ECHO);
        let (code, out, _) = execute(executor.as_ref(), &descriptor, &["--word", "x"]);
        assert_eq!(code, 0);
        assert!(out.contains("top 5"));
        assert!(temp.path().join("alpha.prof.json").exists());
    }
}
