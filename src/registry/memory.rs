//! In-memory registry for embedders and tests.

use std::collections::HashMap;

use super::{CommandNames, CommandRegistry, RegistryError, RegistryLoader, RegistryResult};
use crate::command::descriptor::dashed;
use crate::command::CommandDescriptor;

/// Registry whose entries are supplied in code, in insertion order.
#[derive(Debug, Clone)]
pub struct InMemoryRegistry {
    module_id: String,
    names: CommandNames,
    entries: HashMap<String, Result<CommandDescriptor, String>>,
}

impl InMemoryRegistry {
    pub fn new(module_id: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            names: CommandNames::new(),
            entries: HashMap::new(),
        }
    }

    /// Add a loadable command.
    pub fn with_command(mut self, descriptor: CommandDescriptor) -> Self {
        let key = dashed(&descriptor.name);
        self.names.push(&key);
        self.entries.insert(key, Ok(descriptor));
        self
    }

    /// Add a name whose descriptor fails to load with `message`.
    pub fn with_failure(mut self, name: &str, message: impl Into<String>) -> Self {
        self.names.push(name);
        self.entries.insert(dashed(name), Err(message.into()));
        self
    }
}

impl CommandRegistry for InMemoryRegistry {
    fn module_id(&self) -> &str {
        &self.module_id
    }

    fn names(&self) -> &CommandNames {
        &self.names
    }

    fn load(&self, name: &str) -> RegistryResult<CommandDescriptor> {
        match self.entries.get(&dashed(name)) {
            Some(Ok(descriptor)) => Ok(descriptor.clone()),
            Some(Err(message)) => Err(RegistryError::LoadFailed {
                name: name.to_string(),
                message: message.clone(),
            }),
            None => Err(RegistryError::CommandNotFound(name.to_string())),
        }
    }
}

/// Loader serving a fixed set of in-memory registries by module id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    registries: HashMap<String, InMemoryRegistry>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(mut self, registry: InMemoryRegistry) -> Self {
        self.registries
            .insert(registry.module_id.clone(), registry);
        self
    }
}

impl RegistryLoader for InMemoryLoader {
    fn open(&self, module_id: &str) -> RegistryResult<Box<dyn CommandRegistry>> {
        self.registries
            .get(module_id)
            .cloned()
            .map(|r| Box::new(r) as Box<dyn CommandRegistry>)
            .ok_or_else(|| RegistryError::ModuleNotFound {
                module_id: module_id.to_string(),
                searched: Vec::new(),
            })
    }
}
