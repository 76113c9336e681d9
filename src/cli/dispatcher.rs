//! Top-level dispatch: usage, per-command help, or running a command
//!
//! ```text
//! raw args ──preprocess──> InvocationContext ──open──> CommandRegistry
//!                                                         │
//!                         decide(args, names) ────────────┘
//!                                │
//!      ┌──────────────┬──────────┴─────────┬──────────────────┐
//!  ShowUsage   ShowCommandHelp        RunCommand        UnknownCommand
//!   exit 0         exit 0        command's own status       exit 1
//! ```

use std::io::Write;

use colored::*;

use super::error::{DispatchError, DispatchResult};
use super::parser::ArgumentParser;
use super::preprocess::{InvocationContext, DRIVER_OPTIONS};
use super::usage::{render_unknown_command, render_usage};
use crate::command::CommandDescriptor;
use crate::config::DriverConfig;
use crate::executor::Executor;
use crate::registry::{CommandNames, CommandRegistry, RegistryLoader};

pub const EXIT_SUCCESS: i32 = 0;

/// First arguments that ask for help, compared case-insensitively
pub const HELP_TOKENS: [&str; 4] = ["help", "--help", "-?", "-h"];

pub fn is_help_token(arg: &str) -> bool {
    HELP_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(arg))
}

/// What one invocation resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchAction {
    ShowUsage,
    ShowCommandHelp { command: String },
    RunCommand { command: String, args: Vec<String> },
    UnknownCommand { command: String },
}

/// Decide the action from the residual arguments and the discovered names.
/// Only membership is checked here; nothing is loaded.
pub fn decide(args: &[String], names: &CommandNames) -> DispatchAction {
    let Some((first, rest)) = args.split_first() else {
        return DispatchAction::ShowUsage;
    };

    if is_help_token(first) {
        return match rest.first() {
            None => DispatchAction::ShowUsage,
            Some(target) if names.contains(target) => DispatchAction::ShowCommandHelp {
                command: target.clone(),
            },
            Some(target) => DispatchAction::UnknownCommand {
                command: target.clone(),
            },
        };
    }

    if names.contains(first) {
        DispatchAction::RunCommand {
            command: first.clone(),
            args: rest.to_vec(),
        }
    } else {
        DispatchAction::UnknownCommand {
            command: first.clone(),
        }
    }
}

/// Drives one invocation from raw arguments to an exit code
pub struct Dispatcher {
    loader: Box<dyn RegistryLoader>,
    executor: Box<dyn Executor>,
    defaults: DriverConfig,
}

impl Dispatcher {
    pub fn new(
        loader: Box<dyn RegistryLoader>,
        executor: Box<dyn Executor>,
        defaults: DriverConfig,
    ) -> Self {
        Self {
            loader,
            executor,
            defaults,
        }
    }

    /// Run one invocation. `raw` excludes the executable path. Never exits
    /// the process; the returned code is for the caller to exit with.
    pub fn run<I, S>(&self, raw: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.try_run(raw, out, err) {
            Ok(code) => code,
            Err(e) => {
                report(&e, err);
                e.exit_code()
            }
        }
    }

    fn try_run<I, S>(&self, raw: I, out: &mut dyn Write, err: &mut dyn Write) -> DispatchResult<i32>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ctx = InvocationContext::from_args(raw, &self.defaults)?;
        tracing::debug!(
            driver = ctx.driver_name(),
            module = ctx.command_config_module(),
            args = ?ctx.args(),
            "preprocessed arguments"
        );

        if let Some(first) = ctx.args().first() {
            if DRIVER_OPTIONS.contains(&first.as_str()) {
                return Err(DispatchError::MisplacedDriverOption(first.clone()));
            }
        }

        let registry = self.loader.open(ctx.command_config_module())?;
        let action = decide(ctx.args(), registry.names());
        tracing::debug!(?action, "dispatching");

        match action {
            DispatchAction::ShowUsage => {
                let listing = registry.listing();
                out.write_all(render_usage(ctx.driver_name(), &listing).as_bytes())?;
                Ok(EXIT_SUCCESS)
            }
            DispatchAction::ShowCommandHelp { command } => {
                let descriptor = load_command(registry.as_ref(), &command)?;
                let parser =
                    ArgumentParser::build(&descriptor, ctx.program_name(Some(&descriptor.name)));
                out.write_all(parser.render_help().as_bytes())?;
                Ok(EXIT_SUCCESS)
            }
            DispatchAction::RunCommand { command, args } => {
                let descriptor = load_command(registry.as_ref(), &command)?;
                let parser =
                    ArgumentParser::build(&descriptor, ctx.program_name(Some(&descriptor.name)));
                let status = self.executor.execute(&descriptor, &parser, &args, out, err);
                tracing::debug!(command = %descriptor.name, status, "command finished");
                Ok(status)
            }
            DispatchAction::UnknownCommand { command } => Err(DispatchError::UnknownCommand {
                command,
                driver_name: ctx.driver_name().to_string(),
                module_id: registry.module_id().to_string(),
            }),
        }
    }
}

/// Load a descriptor on a path where failure ends the invocation.
fn load_command(registry: &dyn CommandRegistry, name: &str) -> DispatchResult<CommandDescriptor> {
    registry.load(name).map_err(|source| {
        tracing::warn!(command = name, error = %source, "command failed to load");
        DispatchError::CommandLoad {
            name: name.to_string(),
            source,
        }
    })
}

fn report(error: &DispatchError, err: &mut dyn Write) {
    let _ = writeln!(err, "{} {}", "Error:".red().bold(), error);
    if let DispatchError::UnknownCommand {
        command,
        driver_name,
        module_id,
    } = error
    {
        let _ = err.write_all(render_unknown_command(driver_name, module_id, command).as_bytes());
    }
}
