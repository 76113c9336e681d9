//! Driver-option preprocessing
//!
//! Driver-level options are only recognized before a literal `--`:
//!
//! ```text
//! dispatchkit --driver-name mytool --command-config-module custom.module -- alpha arg1
//!             └──────────────── driver options ─────────────────────────┘    └ residual ┘
//! ```
//!
//! Without a separator nothing is stripped and every argument belongs to the
//! command invocation.

use std::ffi::OsString;

use super::error::{DispatchError, DispatchResult};
use crate::config::DriverConfig;

/// Ends the driver options
pub const SEPARATOR: &str = "--";

/// Values starting with this are treated as a missing value
pub const OPTION_PREFIX: &str = "--";

pub const DRIVER_NAME_OPTION: &str = "--driver-name";
pub const COMMAND_CONFIG_MODULE_OPTION: &str = "--command-config-module";

/// Every option the preprocessor understands
pub const DRIVER_OPTIONS: [&str; 2] = [DRIVER_NAME_OPTION, COMMAND_CONFIG_MODULE_OPTION];

/// Convert process arguments (as from `std::env::args_os`) to strings,
/// rejecting the first one that is not valid UTF-8.
pub fn unicode_args<I>(raw: I) -> DispatchResult<Vec<String>>
where
    I: IntoIterator<Item = OsString>,
{
    raw.into_iter()
        .map(|arg| {
            arg.into_string()
                .map_err(|arg| DispatchError::NonUnicodeArgument(arg.to_string_lossy().into_owned()))
        })
        .collect()
}

/// What one invocation is about, derived once from the raw arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    driver_name: String,
    command_config_module: String,
    args: Vec<String>,
}

impl InvocationContext {
    pub fn new(
        driver_name: impl Into<String>,
        command_config_module: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            driver_name: driver_name.into(),
            command_config_module: command_config_module.into(),
            args,
        }
    }

    /// Strip driver options from `raw` (process arguments without the
    /// executable path), falling back to `defaults`.
    pub fn from_args<I, S>(raw: I, defaults: &DriverConfig) -> DispatchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let raw: Vec<String> = raw.into_iter().map(Into::into).collect();

        let Some(separator) = raw.iter().position(|arg| arg == SEPARATOR) else {
            return Ok(Self::new(
                defaults.name.clone(),
                defaults.command_config_module.clone(),
                raw,
            ));
        };

        let mut driver_name = defaults.name.clone();
        let mut command_config_module = defaults.command_config_module.clone();
        let mut unrecognized = Vec::new();

        let mut options = raw[..separator].iter();
        while let Some(arg) = options.next() {
            match arg.as_str() {
                DRIVER_NAME_OPTION => driver_name = option_value(arg, options.next())?,
                COMMAND_CONFIG_MODULE_OPTION => {
                    command_config_module = option_value(arg, options.next())?
                }
                _ => unrecognized.push(arg.clone()),
            }
        }

        if !unrecognized.is_empty() {
            return Err(DispatchError::UnrecognizedOptions(unrecognized));
        }

        Ok(Self::new(
            driver_name,
            command_config_module,
            raw[separator + 1..].to_vec(),
        ))
    }

    /// Display name of the driver
    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    /// Registry module to open
    pub fn command_config_module(&self) -> &str {
        &self.command_config_module
    }

    /// Residual arguments: the command name and its arguments
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Name shown in help and usage lines: the driver, optionally followed
    /// by the command.
    pub fn program_name(&self, command: Option<&str>) -> String {
        match command {
            Some(command) => format!("{} {}", self.driver_name, command),
            None => self.driver_name.clone(),
        }
    }
}

fn option_value(option: &str, value: Option<&String>) -> DispatchResult<String> {
    match value {
        Some(value) if !value.starts_with(OPTION_PREFIX) => Ok(value.clone()),
        _ => Err(DispatchError::missing_value(option)),
    }
}
