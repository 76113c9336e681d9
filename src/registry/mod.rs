//! Command Registry Module
//!
//! Maps a configuration module identifier to an ordered set of command
//! names and, per name, a validated [`CommandDescriptor`] or a load error.
//!
//! The dispatcher only sees the [`CommandRegistry`] and [`RegistryLoader`]
//! traits. Two implementations ship with the crate:
//!
//! - [`TomlRegistry`] - a directory of `<command>.toml` descriptor files
//! - [`InMemoryRegistry`] - descriptors supplied in code
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dispatchkit::command::ConstructorTable;
//! use dispatchkit::registry::{CommandRegistry, TomlRegistry};
//! use std::path::PathBuf;
//!
//! let registry = TomlRegistry::open(
//!     "dispatchkit.commands",
//!     &[PathBuf::from(".")],
//!     ConstructorTable::builtin(),
//! )?;
//!
//! for name in registry.names().iter() {
//!     println!("{}", name);
//! }
//! # Ok::<(), dispatchkit::registry::RegistryError>(())
//! ```
//!
//! [`CommandDescriptor`]: crate::command::CommandDescriptor

mod directory;
mod error;
mod memory;
mod names;
mod registry;

pub use directory::{resolve_module_dir, TomlRegistry, TomlRegistryLoader};
pub use error::{RegistryError, RegistryResult};
pub use memory::{InMemoryLoader, InMemoryRegistry};
pub use names::CommandNames;
pub use registry::{CommandListing, CommandRegistry, ListedCommand, RegistryLoader, Resolution};
