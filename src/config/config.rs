//! TOML driver settings.
//!
//! ```toml
//! [driver]
//! name = "mytool"
//! command_config_module = "mytool.commands"
//! command_path = ["/usr/share/mytool", "."]
//!
//! [profiling]
//! enabled = false
//! output_dir = "profiles"
//! top_n = 25
//!
//! [logging]
//! filter = "dispatchkit=debug"
//! ```
//!
//! Every section and key is optional. Environment variables override the
//! file (see [`EnvironmentLoader`]).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::environment::EnvironmentLoader;

pub const DEFAULT_DRIVER_NAME: &str = "dispatchkit";
pub const DEFAULT_COMMAND_CONFIG_MODULE: &str = "dispatchkit.commands";
pub const DEFAULT_PROFILE_TOP_N: usize = 25;
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Complete driver settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverSettings {
    pub driver: DriverConfig,
    pub profiling: ProfilingConfig,
    pub logging: LoggingConfig,
}

/// Defaults used when no driver options precede `--`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    pub name: String,
    pub command_config_module: String,
    /// Roots searched for dotted module identifiers, in order
    pub command_path: Vec<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DRIVER_NAME.to_string(),
            command_config_module: DEFAULT_COMMAND_CONFIG_MODULE.to_string(),
            command_path: vec![PathBuf::from(".")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfilingConfig {
    pub enabled: bool,
    pub output_dir: PathBuf,
    pub top_n: usize,
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_dir: PathBuf::from("."),
            top_n: DEFAULT_PROFILE_TOP_N,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// tracing-subscriber `EnvFilter` directive
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl DriverSettings {
    /// Settings from the file named by the environment (if any), then
    /// overridden by environment variables.
    pub fn load(env: &EnvironmentLoader) -> Result<Self> {
        let mut settings = match env.config_file() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        settings.apply_env(env);
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut settings: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?;

        if settings.driver.command_path.is_empty() {
            settings.driver.command_path = DriverConfig::default().command_path;
        }
        Ok(settings)
    }

    /// Apply environment overrides in place.
    pub fn apply_env(&mut self, env: &EnvironmentLoader) {
        if let Some(path) = env.command_path() {
            self.driver.command_path = path;
        }
        if let Some(enabled) = env.profile_command() {
            self.profiling.enabled = enabled;
        }
        if let Some(dir) = env.profile_dir() {
            self.profiling.output_dir = dir;
        }
        if let Some(filter) = env.log_filter() {
            self.logging.filter = filter;
        }
    }
}
