//! Command model
//!
//! A command is described declaratively by a [`CommandDescriptor`] and
//! implemented by something that satisfies the [`Command`] trait. The
//! descriptor names a constructor in a [`ConstructorTable`]; the constructor
//! receives the descriptor's `[settings]` table and returns the runnable
//! command.
//!
//! ```
//! use dispatchkit::command::{ConstructorTable, Inputs, Value};
//!
//! let table = ConstructorTable::builtin();
//! let echo = table.construct("echo", &toml::Table::new()).unwrap();
//!
//! let mut inputs = Inputs::new();
//! inputs.insert("text".to_string(), Value::Str("hi".to_string()));
//! let outcome = echo.run(&inputs).unwrap();
//! assert_eq!(outcome.status, 0);
//! assert_eq!(outcome.results["text"], Value::Str("hi".to_string()));
//! ```

pub mod constructors;
pub mod descriptor;
pub mod error;
pub mod handlers;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

pub use constructors::{Constructor, ConstructorTable, EchoCommand, ExecCommand};
pub use descriptor::{
    CommandDescriptor, CommandManifest, InputAction, InputSpec, InputType, OutputSpec,
    UsageExample,
};
pub use error::{DescriptorError, HandlerError, HandlerResult};
pub use handlers::{InputHandler, OutputHandler};

/// Free-form `[settings]` table handed to a constructor.
pub type Settings = toml::Table;

/// Parsed input values keyed by input name.
pub type Inputs = BTreeMap<String, Value>;

/// Command results keyed by result name.
pub type Results = BTreeMap<String, Value>;

/// A typed value flowing from the parser into a command and back out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Path(PathBuf),
    List(Vec<String>),
}

impl Value {
    /// Borrow the value as a list of strings, if it is one.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Interpret the value as a filesystem path.
    pub fn as_path(&self) -> Option<PathBuf> {
        match self {
            Value::Path(p) => Some(p.clone()),
            Value::Str(s) => Some(PathBuf::from(s)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::List(items) => write!(f, "{}", items.join(",")),
        }
    }
}

/// What a command hands back to the executor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutcome {
    pub results: Results,
    /// Process exit status the driver should report.
    pub status: i32,
}

impl CommandOutcome {
    /// Successful outcome carrying `results`.
    pub fn success(results: Results) -> Self {
        Self { results, status: 0 }
    }

    pub fn with_status(results: Results, status: i32) -> Self {
        Self { results, status }
    }
}

/// The executable logic behind a command.
///
/// Implementations are external collaborators of the dispatcher: it only
/// constructs them, hands them the parsed inputs and passes their status
/// through.
pub trait Command {
    fn run(&self, inputs: &Inputs) -> anyhow::Result<CommandOutcome>;

    /// Called once after construction with the descriptor's declared inputs.
    fn bind_inputs(&mut self, _inputs: &[InputSpec]) {}
}
