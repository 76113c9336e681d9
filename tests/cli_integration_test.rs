//! Binary integration tests
//!
//! These run the `dispatchkit` executable against registries on disk.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ALPHA: &str = r#"
constructor = "echo"
description = "Echo a word back"
help_on_no_arguments = false

[[usage_examples]]
short_desc = "Greet"
long_desc = "Echo a greeting"
example = "%prog --word hello"

[[inputs]]
name = "word"
help = "Word to echo"

[[inputs]]
name = "tags"
handler = "split_comma"

[[outputs]]
name = "word"
handler = "print_string"

[[outputs]]
name = "tags"
handler = "print_list_of_strings"
"#;

/// Missing usage examples, so the command cannot load
const BROKEN: &str = r#"
constructor = "echo"
description = "Never loads"
"#;

const ENV_VARS: [&str; 6] = [
    "DISPATCHKIT_CONFIG",
    "DISPATCHKIT_COMMAND_PATH",
    "DISPATCHKIT_PROFILE_COMMAND",
    "DISPATCHKIT_PROFILE_DIR",
    "DISPATCHKIT_ENV_FILE",
    "DISPATCHKIT_LOG",
];

/// `<temp>/mytool/commands` holding the given descriptor files
fn module(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("mytool").join("commands");
    fs::create_dir_all(&dir).unwrap();
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
    (temp, dir)
}

fn dispatchkit(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dispatchkit").unwrap();
    cmd.current_dir(cwd);
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn with_module(cwd: &Path, dir: &Path) -> Command {
    let mut cmd = dispatchkit(cwd);
    cmd.arg("--command-config-module").arg(dir).arg("--");
    cmd
}

#[test]
fn test_usage_lists_commands() {
    let (temp, dir) = module(&[("alpha.toml", ALPHA), ("beta.toml", BROKEN)]);

    with_module(temp.path(), &dir)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Usage: dispatchkit <command> [<args>]\n\nThe currently available commands are:\n    alpha    Echo a word back\n",
        ))
        .stdout(predicate::str::contains(
            "The following commands could not be loaded:\n    beta     There are no usage examples",
        ))
        .stdout(predicate::str::contains(
            "See 'dispatchkit help <command>' for more information on a specific command.",
        ));
}

#[test]
fn test_dotted_module_found_on_command_path() {
    let (temp, _dir) = module(&[("alpha.toml", ALPHA), ("count_lines.toml", ALPHA)]);

    dispatchkit(temp.path())
        .args(["--command-config-module", "mytool.commands", "--", "help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("    alpha"))
        .stdout(predicate::str::contains("    count-lines"));

    let elsewhere = TempDir::new().unwrap();
    dispatchkit(elsewhere.path())
        .env("DISPATCHKIT_COMMAND_PATH", temp.path())
        .args(["--command-config-module", "mytool.commands", "--"])
        .assert()
        .success()
        .stdout(predicate::str::contains("count-lines"));
}

#[test]
fn test_run_command_with_handlers() {
    let (temp, dir) = module(&[("alpha.toml", ALPHA)]);

    with_module(temp.path(), &dir)
        .args(["alpha", "--word", "hi", "--tags", "a,b"])
        .assert()
        .success()
        .stdout("hi\na\nb\n");
}

#[test]
fn test_command_help() {
    let (temp, dir) = module(&[("alpha.toml", ALPHA)]);

    with_module(temp.path(), &dir)
        .args(["help", "alpha"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Echo a word back"))
        .stdout(predicate::str::contains("dispatchkit alpha --word hello"))
        .stdout(predicate::str::contains("--tags"))
        .stdout(predicate::str::contains("Version: dispatchkit alpha"));
}

#[test]
fn test_unknown_command() {
    let (temp, dir) = module(&[("alpha.toml", ALPHA)]);

    with_module(temp.path(), &dir)
        .arg("gamma")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unrecognized command: gamma"))
        .stderr(predicate::str::contains("    dispatchkit help"));
}

#[test]
fn test_usage_error_exit_code() {
    let (temp, dir) = module(&[("alpha.toml", ALPHA)]);

    with_module(temp.path(), &dir)
        .args(["alpha", "--bogus"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--bogus"));
}

#[test]
fn test_driver_option_without_value() {
    let temp = TempDir::new().unwrap();
    dispatchkit(temp.path())
        .arg("--driver-name")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("requires a value"));
}

#[test]
fn test_missing_module() {
    let temp = TempDir::new().unwrap();
    dispatchkit(temp.path())
        .args(["--command-config-module", "no.such.module", "--"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Unable to load base config module: no.such.module",
        ));
}

#[test]
fn test_settings_file_sets_driver_defaults() {
    let (temp, _dir) = module(&[("alpha.toml", ALPHA)]);
    let config = temp.path().join("dispatchkit.toml");
    fs::write(
        &config,
        "[driver]\nname = \"mytool\"\ncommand_config_module = \"mytool.commands\"\n",
    )
    .unwrap();

    dispatchkit(temp.path())
        .env("DISPATCHKIT_CONFIG", &config)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Usage: mytool <command> [<args>]"))
        .stdout(predicate::str::contains("See 'mytool help <command>'"));
}

#[test]
fn test_profiling_writes_stats() {
    let (temp, dir) = module(&[("alpha.toml", ALPHA)]);
    let profiles = temp.path().join("profiles");

    with_module(temp.path(), &dir)
        .env("DISPATCHKIT_PROFILE_COMMAND", "1")
        .env("DISPATCHKIT_PROFILE_DIR", &profiles)
        .args(["alpha", "--word", "hi"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("hi\n"))
        .stdout(predicate::str::contains("Profile of 'alpha'"));

    let stats = fs::read_to_string(profiles.join("alpha.prof.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stats).unwrap();
    assert_eq!(json["command"], "alpha");
    assert_eq!(json["exit_status"], 0);
}

#[cfg(unix)]
#[test]
fn test_exec_status_passes_through() {
    let exec = r#"
constructor = "exec"
description = "Run a shell snippet"
help_on_no_arguments = false

[settings]
program = "sh"
args = ["-c", "echo {word}; exit 3"]

[[usage_examples]]
example = "%prog --word hi"

[[inputs]]
name = "word"
default = "default-word"

[[outputs]]
name = "stdout"
handler = "print_string"
"#;
    let (temp, dir) = module(&[("shout.toml", exec)]);

    with_module(temp.path(), &dir)
        .args(["shout", "--word", "hey"])
        .assert()
        .code(3)
        .stdout("hey\n");

    with_module(temp.path(), &dir)
        .arg("shout")
        .assert()
        .code(3)
        .stdout("default-word\n");
}

#[cfg(unix)]
#[test]
fn test_non_unicode_argument_is_reported() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let (temp, dir) = module(&[("alpha.toml", ALPHA)]);

    with_module(temp.path(), &dir)
        .arg("alpha")
        .arg("--word")
        .arg(OsStr::from_bytes(b"a\xff"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not valid UTF-8"));
}
