//! Error types for the dispatcher

use thiserror::Error;

use crate::registry::RegistryError;

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors that end an invocation before (or instead of) running a command
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A driver option before `--` had no usable value
    #[error("option {option} requires a value")]
    MissingOptionValue { option: String },

    /// Arguments before `--` that are not driver options
    #[error("Unrecognized driver option(s): {}", .0.join(" "))]
    UnrecognizedOptions(Vec<String>),

    /// A process argument that is not valid UTF-8
    #[error("argument is not valid UTF-8: {0}")]
    NonUnicodeArgument(String),

    /// A driver option used where a command name was expected
    #[error("option {0} requires a value and must appear before the '--' separator")]
    MisplacedDriverOption(String),

    /// The name is not in the discovered command set
    #[error("Unrecognized command: {command}")]
    UnknownCommand {
        command: String,
        driver_name: String,
        module_id: String,
    },

    /// The configuration module could not be opened
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The command exists but its descriptor failed to load
    #[error("Unable to load the command configuration for {name}:\n{source}")]
    CommandLoad {
        name: String,
        #[source]
        source: RegistryError,
    },

    /// Writing to the output or error stream failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatchError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        1
    }

    pub fn missing_value<S: Into<String>>(option: S) -> Self {
        Self::MissingOptionValue {
            option: option.into(),
        }
    }
}
