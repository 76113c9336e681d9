//! Driver configuration.
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables, optionally seeded from a `.env` file.
//!
//! # Example
//!
//! ```no_run
//! use dispatchkit::config::{DriverSettings, EnvironmentLoader};
//!
//! let env = EnvironmentLoader::from_env();
//! let settings = DriverSettings::load(&env)?;
//!
//! println!("Driver: {}", settings.driver.name);
//! println!("Profiling: {}", settings.profiling.enabled);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod environment;

pub use self::config::{DriverConfig, DriverSettings, LoggingConfig, ProfilingConfig};
pub use self::environment::EnvironmentLoader;
