//! dispatchkit - a declarative command dispatcher for CLI drivers
//!
//! A single driver binary exposes a family of commands. Each command is
//! described by a TOML descriptor inside a configuration module (a
//! directory); the driver discovers the commands, renders a usage listing,
//! builds a per-command argument parser and runs the selected command.
//!
//! - **`cli`** - driver-option preprocessing, dispatch, parser factory, usage rendering
//! - **`registry`** - command discovery and descriptor loading
//! - **`command`** - descriptors, the `Command` trait, constructors and handlers
//! - **`executor`** - direct and profiling execution strategies
//! - **`config`** - TOML settings and environment overrides
//! - **`observability`** - tracing subscriber setup
//!
//! # Features
//!
//! ```toml
//! [dependencies]
//! dispatchkit = { version = "0.1", default-features = false }
//! # Profiling executor (serde_json + chrono), on by default:
//! dispatchkit = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dispatchkit::prelude::*;
//!
//! let env = EnvironmentLoader::from_env();
//! let settings = DriverSettings::load(&env)?;
//!
//! let loader = TomlRegistryLoader::new(
//!     settings.driver.command_path.clone(),
//!     ConstructorTable::builtin(),
//! );
//! let dispatcher = Dispatcher::new(
//!     Box::new(loader),
//!     executor_for(&settings.profiling),
//!     settings.driver.clone(),
//! );
//!
//! let code = dispatcher.run(
//!     ["help"],
//!     &mut std::io::stdout(),
//!     &mut std::io::stderr(),
//! );
//! assert_eq!(code, 0);
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Driver front end
pub mod cli;

/// Command model
pub mod command;

/// Configuration management
pub mod config;

/// Execution strategies
pub mod executor;

/// Observability utilities
pub mod observability;

/// Command registries
pub mod registry;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cli::{DispatchError, Dispatcher, InvocationContext};
    pub use crate::command::{
        Command, CommandDescriptor, CommandOutcome, ConstructorTable, Inputs, Results, Value,
    };
    pub use crate::config::{DriverConfig, DriverSettings, EnvironmentLoader};
    pub use crate::executor::{executor_for, DirectExecutor, Executor};
    pub use crate::registry::{
        CommandRegistry, InMemoryLoader, InMemoryRegistry, RegistryLoader, TomlRegistryLoader,
    };
}
