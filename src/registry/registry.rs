//! Registry capability: name discovery plus per-name descriptor loading.

use unicode_width::UnicodeWidthStr;

use super::{CommandNames, RegistryResult};
use crate::command::CommandDescriptor;

/// Source of truth mapping command names to descriptors for one driver
/// configuration.
///
/// Discovery happens when the registry is opened (see [`RegistryLoader`]);
/// after that the registry is read-only. Existence and loadability are
/// independent: [`contains`](CommandRegistry::contains) is a pure
/// membership test and never touches a descriptor.
pub trait CommandRegistry {
    /// Identifier of the configuration module this registry was opened from.
    fn module_id(&self) -> &str;

    /// Discovered names, in discovery order.
    fn names(&self) -> &CommandNames;

    /// Load and validate the descriptor for `name`.
    fn load(&self, name: &str) -> RegistryResult<CommandDescriptor>;

    /// Whether `name` was discovered.
    fn contains(&self, name: &str) -> bool {
        self.names().contains(name)
    }

    /// Load `name`, keeping a failure as data.
    fn resolve(&self, name: &str) -> Resolution {
        match self.load(name) {
            Ok(descriptor) => Resolution::Valid(descriptor),
            Err(e) => {
                tracing::debug!(command = name, error = %e, "command failed to load");
                Resolution::Invalid(e.to_string())
            }
        }
    }

    /// Resolve every discovered name and split the results into loadable
    /// and failed commands, each in discovery order.
    fn listing(&self) -> CommandListing {
        let mut listing = CommandListing::default();
        for name in self.names().iter() {
            match self.resolve(name) {
                Resolution::Valid(descriptor) => listing.valid.push(ListedCommand {
                    name: name.to_string(),
                    text: descriptor.description,
                }),
                Resolution::Invalid(message) => listing.invalid.push(ListedCommand {
                    name: name.to_string(),
                    text: message,
                }),
            }
        }
        listing
    }
}

/// Opens a registry from a configuration module identifier.
pub trait RegistryLoader {
    /// Fails when the identifier cannot be resolved at all.
    fn open(&self, module_id: &str) -> RegistryResult<Box<dyn CommandRegistry>>;
}

/// Outcome of resolving one name.
#[derive(Debug, Clone)]
pub enum Resolution {
    Valid(CommandDescriptor),
    /// Load failed; the message is what the user gets to see.
    Invalid(String),
}

impl Resolution {
    pub fn is_valid(&self) -> bool {
        matches!(self, Resolution::Valid(_))
    }
}

/// One line of a usage listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedCommand {
    pub name: String,
    /// Brief description, or the load error for invalid commands.
    pub text: String,
}

/// Every discovered command, partitioned by load outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandListing {
    pub valid: Vec<ListedCommand>,
    pub invalid: Vec<ListedCommand>,
}

impl CommandListing {
    /// Widest name across both partitions, in terminal columns.
    pub fn max_name_width(&self) -> usize {
        self.valid
            .iter()
            .chain(self.invalid.iter())
            .map(|c| c.name.width())
            .max()
            .unwrap_or(0)
    }
}
