//! Argument parser factory - turns a CommandDescriptor into a clap Command
//!
//! The parser is built per invocation from the descriptor alone; building
//! never runs anything. Help, version and usage errors come back from
//! [`ArgumentParser::parse`] as an [`EarlyExit`] so the caller decides
//! where the text goes.

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use unicode_width::UnicodeWidthStr;

use crate::command::{CommandDescriptor, InputAction, InputSpec, InputType, Inputs, Value};

/// Heading that groups required inputs in help output
pub const REQUIRED_HEADING: &str = "REQUIRED options";

/// Suffix appended to the help text of required inputs
pub const REQUIRED_SUFFIX: &str = "[REQUIRED]";

/// Replaced by the program name in usage examples
pub const PROG_PLACEHOLDER: &str = "%prog";

/// Exit code clap uses for usage errors
pub const USAGE_ERROR_CODE: i32 = 2;

const HELP_TEMPLATE: &str = "\
{about-with-newline}
{usage-heading} {usage}

{all-args}

{after-help}";

/// Parsing stopped without producing inputs: help, version or a usage error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarlyExit {
    pub code: i32,
    pub message: String,
    pub to_stderr: bool,
}

impl EarlyExit {
    fn usage(message: String) -> Self {
        Self {
            code: USAGE_ERROR_CODE,
            message,
            to_stderr: true,
        }
    }
}

impl From<clap::Error> for EarlyExit {
    fn from(err: clap::Error) -> Self {
        Self {
            code: err.exit_code(),
            message: err.render().to_string(),
            to_stderr: err.use_stderr(),
        }
    }
}

/// Parser for one command, bound to the name it is displayed under
pub struct ArgumentParser<'a> {
    descriptor: &'a CommandDescriptor,
    program_name: String,
    command: Command,
}

impl<'a> ArgumentParser<'a> {
    /// Build the parser for `descriptor`, displayed as `program_name`
    /// (for example `mytool alpha`).
    pub fn build(descriptor: &'a CommandDescriptor, program_name: impl Into<String>) -> Self {
        let program_name = program_name.into();

        let mut command = Command::new(descriptor.name.clone())
            .bin_name(program_name.clone())
            .display_name(program_name.clone())
            .version(descriptor.version.clone())
            .about(descriptor.description.clone())
            .after_help(after_help(descriptor, &program_name))
            .help_template(HELP_TEMPLATE);

        if let Some(long) = &descriptor.long_description {
            command = command.long_about(format!("{}\n\n{}", descriptor.description, long.trim()));
        }

        for input in &descriptor.inputs {
            command = command.arg(build_arg(input));
        }

        Self {
            descriptor,
            program_name,
            command,
        }
    }

    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    /// Parse the command's arguments (without the command name).
    pub fn parse(&self, args: &[String]) -> Result<Inputs, EarlyExit> {
        if args.is_empty() && self.descriptor.help_on_no_arguments && !self.descriptor.inputs.is_empty() {
            return Err(EarlyExit::usage(format!(
                "{}\n\nFor more information, try '--help'.\n",
                self.render_usage()
            )));
        }

        let argv = std::iter::once(self.descriptor.name.clone()).chain(args.iter().cloned());
        let matches = self.command.clone().try_get_matches_from(argv)?;

        let mut inputs = Inputs::new();
        for input in &self.descriptor.inputs {
            if let Some(value) = extract(&matches, input) {
                inputs.insert(input.name.clone(), value);
            }
        }
        tracing::debug!(command = %self.descriptor.name, inputs = inputs.len(), "parsed arguments");
        Ok(inputs)
    }

    /// Full help text, as printed by `--help`.
    pub fn render_help(&self) -> String {
        self.command.clone().render_long_help().to_string()
    }

    /// The `Usage: ...` line.
    pub fn render_usage(&self) -> String {
        self.command.clone().render_usage().to_string()
    }
}

fn build_arg(input: &InputSpec) -> Arg {
    let mut help = input.help.trim().to_string();
    let mut arg = Arg::new(input.name.clone()).long(input.long_name());
    if !input.action.is_flag() {
        arg = arg.value_name(input.name.to_uppercase().replace('-', "_"));
    }

    if let Some(short) = input.short {
        arg = arg.short(short);
    }

    arg = match input.action {
        InputAction::StoreTrue => arg.action(ArgAction::SetTrue),
        InputAction::StoreFalse => arg.action(ArgAction::SetFalse),
        InputAction::Append => with_value_parser(arg.action(ArgAction::Append), input.input_type),
        InputAction::Store => with_value_parser(arg.action(ArgAction::Set), input.input_type),
    };

    if input.required {
        arg = arg.required(true).help_heading(REQUIRED_HEADING);
        if !help.ends_with(REQUIRED_SUFFIX) {
            if !help.is_empty() {
                help.push(' ');
            }
            help.push_str(REQUIRED_SUFFIX);
        }
    }

    if let Some(default) = input.default_literal() {
        arg = arg.default_value(default);
        if let Some(description) = &input.default_description {
            arg = arg.hide_default_value(true);
            help.push_str(&format!(" [default: {}]", description));
        }
    }

    arg.help(help)
}

fn with_value_parser(arg: Arg, input_type: InputType) -> Arg {
    match input_type {
        InputType::Str | InputType::Bool => arg.value_parser(clap::value_parser!(String)),
        InputType::Int => arg.value_parser(clap::value_parser!(i64)),
        InputType::Float => arg.value_parser(clap::value_parser!(f64)),
        InputType::ExistingFilepath => arg
            .value_parser(existing_file)
            .value_hint(ValueHint::FilePath),
        InputType::ExistingDirpath => arg
            .value_parser(existing_dir)
            .value_hint(ValueHint::DirPath),
        InputType::NewFilepath => arg
            .value_parser(clap::value_parser!(PathBuf))
            .value_hint(ValueHint::FilePath),
        InputType::NewDirpath => arg
            .value_parser(clap::value_parser!(PathBuf))
            .value_hint(ValueHint::DirPath),
    }
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("'{}' is not an existing file", value))
    }
}

fn existing_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("'{}' is not an existing directory", value))
    }
}

/// Read one input back out of the matches, typed the way its parser was.
fn extract(matches: &ArgMatches, input: &InputSpec) -> Option<Value> {
    let id = input.name.as_str();
    match input.action {
        InputAction::StoreTrue | InputAction::StoreFalse => {
            matches.get_one::<bool>(id).copied().map(Value::Bool)
        }
        InputAction::Append => match input.input_type {
            InputType::Int => many::<i64>(matches, id, |v| v.to_string()),
            InputType::Float => many::<f64>(matches, id, |v| v.to_string()),
            t if t.is_path() => many::<PathBuf>(matches, id, |p| p.display().to_string()),
            _ => many::<String>(matches, id, Clone::clone),
        },
        InputAction::Store => match input.input_type {
            InputType::Int => matches.get_one::<i64>(id).copied().map(Value::Int),
            InputType::Float => matches.get_one::<f64>(id).copied().map(Value::Float),
            t if t.is_path() => matches.get_one::<PathBuf>(id).cloned().map(Value::Path),
            _ => matches.get_one::<String>(id).cloned().map(Value::Str),
        },
    }
}

fn many<T>(matches: &ArgMatches, id: &str, render: impl Fn(&T) -> String) -> Option<Value>
where
    T: Clone + Send + Sync + 'static,
{
    matches
        .get_many::<T>(id)
        .map(|values| Value::List(values.map(&render).collect()))
}

/// Outputs, usage examples and the version line, shown after the options.
fn after_help(descriptor: &CommandDescriptor, program_name: &str) -> String {
    let mut sections = Vec::new();

    if !descriptor.outputs.is_empty() {
        let width = descriptor
            .outputs
            .iter()
            .map(|o| o.name.width())
            .max()
            .unwrap_or(0);
        let mut outputs = String::from("Outputs:");
        for output in &descriptor.outputs {
            let pad = " ".repeat(width - output.name.width());
            outputs.push_str(&format!(
                "\n  {}{}  {}",
                output.name,
                pad,
                output.description()
            ));
        }
        sections.push(outputs);
    }

    let mut examples = format!(
        "Example usage:\n  Print help message and exit\n    {} -h",
        program_name
    );
    for example in &descriptor.usage_examples {
        let heading = match (example.short_desc.trim(), example.long_desc.trim()) {
            ("", "") => None,
            (short, "") => Some(short.to_string()),
            ("", long) => Some(long.to_string()),
            (short, long) => Some(format!("{}: {}", short, long)),
        };
        examples.push('\n');
        if let Some(heading) = heading {
            examples.push_str(&format!("\n  {}", heading));
        }
        examples.push_str(&format!(
            "\n    {}",
            example.example.replace(PROG_PLACEHOLDER, program_name)
        ));
    }
    sections.push(examples);

    sections.push(format!("Version: {} {}", program_name, descriptor.version));
    sections.join("\n\n")
}
