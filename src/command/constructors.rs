//! Constructor table - maps descriptor `constructor` keys to command factories
//!
//! Descriptors never contain code. They name a constructor registered here,
//! and the constructor turns the descriptor's `[settings]` table into a
//! runnable [`Command`]. Embedders register their own constructors next to
//! the built-in `echo` and `exec`.

use super::{Command, CommandOutcome, InputAction, InputSpec, Inputs, Results, Settings, Value};
use anyhow::{anyhow, bail, Context};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::process::{Command as ProcessCommand, Stdio};
use std::sync::Arc;

/// Factory building a command from its settings table
pub type Constructor =
    Arc<dyn Fn(&Settings) -> anyhow::Result<Box<dyn Command>> + Send + Sync>;

/// Registry of named constructors
#[derive(Clone, Default)]
pub struct ConstructorTable {
    constructors: BTreeMap<String, Constructor>,
}

impl fmt::Debug for ConstructorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.constructors.keys()).finish()
    }
}

impl ConstructorTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the built-in `echo` and `exec` constructors
    pub fn builtin() -> Self {
        Self::new()
            .register("echo", |_settings: &Settings| {
                Ok(Box::new(EchoCommand) as Box<dyn Command>)
            })
            .register("exec", |settings: &Settings| {
                Ok(Box::new(ExecCommand::from_settings(settings)?) as Box<dyn Command>)
            })
    }

    /// Register a constructor under `name`, replacing any previous one
    pub fn register<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&Settings) -> anyhow::Result<Box<dyn Command>> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
        self
    }

    pub fn get(&self, name: &str) -> Option<Constructor> {
        self.constructors.get(name).cloned()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Look up `name` and build a command from `settings`
    pub fn construct(&self, name: &str, settings: &Settings) -> anyhow::Result<Box<dyn Command>> {
        let constructor = self
            .get(name)
            .ok_or_else(|| anyhow!("unknown constructor: {}", name))?;
        constructor(settings)
    }
}

/// Returns its inputs unchanged as results
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoCommand;

impl Command for EchoCommand {
    fn run(&self, inputs: &Inputs) -> anyhow::Result<CommandOutcome> {
        Ok(CommandOutcome::success(inputs.clone()))
    }
}

/// Runs an external program built from an argument template
///
/// Settings:
/// - `program` - executable to run
/// - `args` - argument templates; `{name}` is replaced by input `name`
///
/// An argument that is exactly `{name}` expands a list input into several
/// arguments, a given flag into `--name`, and is dropped when the input is
/// absent or the flag was not given. A `store_false` flag is given when its
/// value is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecCommand {
    program: String,
    args: Vec<String>,
    negated: BTreeSet<String>,
}

impl ExecCommand {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let program = match settings.get("program") {
            Some(toml::Value::String(p)) if !p.trim().is_empty() => p.clone(),
            Some(_) => bail!("settings.program must be a non-empty string"),
            None => bail!("settings.program is required"),
        };

        let args = match settings.get("args") {
            None => Vec::new(),
            Some(toml::Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    toml::Value::String(s) => Ok(s.clone()),
                    other => Err(anyhow!("settings.args entries must be strings, got {}", other)),
                })
                .collect::<anyhow::Result<Vec<_>>>()?,
            Some(_) => bail!("settings.args must be an array of strings"),
        };

        Ok(Self {
            program,
            args,
            negated: BTreeSet::new(),
        })
    }

    /// Expand the argument templates against `inputs`
    pub fn render_args(&self, inputs: &Inputs) -> Vec<String> {
        let mut rendered = Vec::with_capacity(self.args.len());
        for template in &self.args {
            if let Some(key) = whole_placeholder(template) {
                match inputs.get(key) {
                    Some(Value::List(items)) => rendered.extend(items.iter().cloned()),
                    Some(Value::Bool(value)) => {
                        if *value != self.negated.contains(key) {
                            rendered.push(format!("--{}", key.replace('_', "-")));
                        }
                    }
                    None => {}
                    Some(value) => rendered.push(value.to_string()),
                }
            } else {
                rendered.push(substitute(template, inputs));
            }
        }
        rendered
    }
}

impl Command for ExecCommand {
    fn bind_inputs(&mut self, inputs: &[InputSpec]) {
        self.negated = inputs
            .iter()
            .filter(|input| input.action == InputAction::StoreFalse)
            .map(|input| input.name.clone())
            .collect();
    }

    fn run(&self, inputs: &Inputs) -> anyhow::Result<CommandOutcome> {
        let args = self.render_args(inputs);
        tracing::debug!(program = %self.program, ?args, "spawning exec command");

        let output = ProcessCommand::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to execute {}", self.program))?;

        let mut results = Results::new();
        results.insert(
            "stdout".to_string(),
            Value::Str(String::from_utf8_lossy(&output.stdout).trim_end().to_string()),
        );
        results.insert(
            "stderr".to_string(),
            Value::Str(String::from_utf8_lossy(&output.stderr).trim_end().to_string()),
        );

        Ok(CommandOutcome::with_status(
            results,
            output.status.code().unwrap_or(-1),
        ))
    }
}

/// `"{name}"` -> `Some("name")`
fn whole_placeholder(template: &str) -> Option<&str> {
    let key = template.strip_prefix('{')?.strip_suffix('}')?;
    is_key(key).then_some(key)
}

fn is_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Replace every `{name}` inside `template`; unknown names become empty.
fn substitute(template: &str, inputs: &Inputs) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) if is_key(&after[..end]) => {
                if let Some(value) = inputs.get(&after[..end]) {
                    out.push_str(&value.to_string());
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
