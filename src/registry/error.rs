//! Error types for the command registry.

use std::path::PathBuf;
use thiserror::Error;

use crate::command::DescriptorError;

/// Errors that can occur while discovering or loading commands.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The configuration module identifier did not resolve to anything.
    #[error("Unable to load base config module: {module_id}")]
    ModuleNotFound {
        /// Identifier as given on the command line or in settings.
        module_id: String,
        /// Directories that were tried, in order.
        searched: Vec<PathBuf>,
    },

    /// The name is not part of the discovered command set.
    #[error("Command '{0}' not found")]
    CommandNotFound(String),

    /// The descriptor exists but does not describe a usable command.
    #[error("{source}")]
    InvalidDescriptor {
        /// Command name.
        name: String,
        /// What was wrong with it.
        #[source]
        source: DescriptorError,
    },

    /// A registry backend reported a load failure as plain text.
    #[error("{message}")]
    LoadFailed {
        /// Command name.
        name: String,
        /// Failure text shown to the user.
        message: String,
    },

    /// Reading the module directory or a descriptor file failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
