//! Error types for command descriptors and handlers

use std::path::PathBuf;
use thiserror::Error;

/// A descriptor that parsed but does not describe a usable command.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The TOML itself is malformed or has unknown/mistyped fields
    #[error("{}", .0.message())]
    Parse(#[from] toml::de::Error),

    #[error("description is required")]
    MissingDescription,

    #[error("There are no usage examples associated with this command.")]
    NoUsageExamples,

    #[error("unknown constructor '{name}' (available: {available})")]
    UnknownConstructor { name: String, available: String },

    #[error("constructor '{name}' rejected its settings: {reason}")]
    InvalidSettings { name: String, reason: String },

    #[error("input names must be non-empty")]
    EmptyInputName,

    #[error("found more than one input named '{0}'")]
    DuplicateInput(String),

    #[error("found more than one output named '{0}'")]
    DuplicateOutput(String),

    #[error("input '{name}' uses short flag '-{short}' which {reason}")]
    InvalidShortFlag {
        name: String,
        short: String,
        reason: String,
    },

    #[error("input '{0}' would shadow a built-in --help/--version flag")]
    ReservedInputName(String),

    #[error("found required input '{name}' with default value '{default}'. Required inputs cannot have default values.")]
    RequiredWithDefault { name: String, default: String },

    #[error("input '{name}': {reason}")]
    InvalidInput { name: String, reason: String },

    #[error("output '{name}': {reason}")]
    InvalidOutput { name: String, reason: String },
}

impl DescriptorError {
    pub fn input<S: Into<String>>(name: &str, reason: S) -> Self {
        Self::InvalidInput {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn output<S: Into<String>>(name: &str, reason: S) -> Self {
        Self::InvalidOutput {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for input/output handler operations
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Errors raised while converting inputs or emitting results
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Did not find the expected output '{0}' in results.")]
    MissingResult(String),

    #[error("Output path {} already exists.", .0.display())]
    OutputExists(PathBuf),

    #[error("handler '{handler}' cannot use a {found} value for '{name}'")]
    WrongType {
        handler: &'static str,
        name: String,
        found: &'static str,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
