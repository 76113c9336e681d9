//! CLI front end - from raw process arguments to an exit code
//!
//! # Architecture
//!
//! - [`preprocess`] strips driver options that precede a literal `--`
//! - [`dispatcher`] decides between usage, command help and running a command
//! - [`parser`] builds a clap parser from a command descriptor
//! - [`usage`] renders the driver usage screen and diagnostics
//!
//! # Example
//!
//! ```rust,no_run
//! use dispatchkit::cli::Dispatcher;
//! use dispatchkit::command::ConstructorTable;
//! use dispatchkit::config::DriverConfig;
//! use dispatchkit::executor::DirectExecutor;
//! use dispatchkit::registry::TomlRegistryLoader;
//!
//! let defaults = DriverConfig::default();
//! let loader = TomlRegistryLoader::new(defaults.command_path.clone(), ConstructorTable::builtin());
//! let dispatcher = Dispatcher::new(Box::new(loader), Box::new(DirectExecutor), defaults);
//!
//! let code = dispatcher.run(
//!     std::env::args().skip(1),
//!     &mut std::io::stdout(),
//!     &mut std::io::stderr(),
//! );
//! std::process::exit(code);
//! ```

pub mod dispatcher;
pub mod error;
pub mod parser;
pub mod preprocess;
pub mod usage;

pub use dispatcher::{decide, is_help_token, DispatchAction, Dispatcher};
pub use error::{DispatchError, DispatchResult};
pub use parser::{ArgumentParser, EarlyExit};
pub use preprocess::{unicode_args, InvocationContext};
