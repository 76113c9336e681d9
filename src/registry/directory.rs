//! Filesystem registry: one TOML descriptor file per command.
//!
//! A configuration module identifier such as `dispatchkit.commands` names a
//! directory. It is used as-is when it is an existing directory path;
//! otherwise dots become path separators and the result is looked up under
//! each root of the command search path in order.
//!
//! ```text
//! commands/
//! ├── count_lines.toml   -> count-lines
//! ├── echo.toml          -> echo
//! └── _shared.toml       (ignored)
//! ```

use std::fs;
use std::path::PathBuf;

use super::{CommandNames, CommandRegistry, RegistryError, RegistryLoader, RegistryResult};
use crate::command::descriptor::dashed;
use crate::command::{CommandDescriptor, ConstructorTable};

const DESCRIPTOR_EXTENSION: &str = "toml";

/// Registry backed by a directory of descriptor files.
#[derive(Debug, Clone)]
pub struct TomlRegistry {
    module_id: String,
    dir: PathBuf,
    names: CommandNames,
    constructors: ConstructorTable,
}

impl TomlRegistry {
    /// Resolve `module_id` against `search_path` and discover its commands.
    pub fn open(
        module_id: &str,
        search_path: &[PathBuf],
        constructors: ConstructorTable,
    ) -> RegistryResult<Self> {
        let dir = resolve_module_dir(module_id, search_path)?;
        Self::from_dir(module_id, dir, constructors)
    }

    /// Discover the commands in `dir`.
    pub fn from_dir(
        module_id: &str,
        dir: impl Into<PathBuf>,
        constructors: ConstructorTable,
    ) -> RegistryResult<Self> {
        let dir = dir.into();
        let entries = fs::read_dir(&dir).map_err(|e| RegistryError::io(&dir, e))?;

        let mut stems = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| RegistryError::io(&dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DESCRIPTOR_EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if !stem.starts_with('_') && !stem.is_empty() => {
                    stems.push(stem.to_string())
                }
                _ => {}
            }
        }

        let mut names: CommandNames = stems.iter().collect();
        names.sort();

        tracing::debug!(
            module = module_id,
            dir = %dir.display(),
            commands = names.len(),
            "discovered commands"
        );

        Ok(Self {
            module_id: module_id.to_string(),
            dir,
            names,
            constructors,
        })
    }

    fn descriptor_path(&self, name: &str) -> Option<PathBuf> {
        let underscored = name.replace('-', "_");
        [underscored, dashed(name)]
            .iter()
            .map(|stem| self.dir.join(format!("{}.{}", stem, DESCRIPTOR_EXTENSION)))
            .find(|path| path.is_file())
    }
}

impl CommandRegistry for TomlRegistry {
    fn module_id(&self) -> &str {
        &self.module_id
    }

    fn names(&self) -> &CommandNames {
        &self.names
    }

    fn load(&self, name: &str) -> RegistryResult<CommandDescriptor> {
        if !self.contains(name) {
            return Err(RegistryError::CommandNotFound(name.to_string()));
        }
        let path = self
            .descriptor_path(name)
            .ok_or_else(|| RegistryError::CommandNotFound(name.to_string()))?;

        let content = fs::read_to_string(&path).map_err(|e| RegistryError::io(&path, e))?;

        CommandDescriptor::from_toml_str(name, &content, &self.constructors).map_err(|source| {
            RegistryError::InvalidDescriptor {
                name: name.to_string(),
                source,
            }
        })
    }
}

/// Opens [`TomlRegistry`] instances for the dispatcher.
#[derive(Debug, Clone)]
pub struct TomlRegistryLoader {
    search_path: Vec<PathBuf>,
    constructors: ConstructorTable,
}

impl TomlRegistryLoader {
    pub fn new(search_path: Vec<PathBuf>, constructors: ConstructorTable) -> Self {
        Self {
            search_path,
            constructors,
        }
    }
}

impl RegistryLoader for TomlRegistryLoader {
    fn open(&self, module_id: &str) -> RegistryResult<Box<dyn CommandRegistry>> {
        let registry = TomlRegistry::open(module_id, &self.search_path, self.constructors.clone())?;
        Ok(Box::new(registry))
    }
}

/// Map a module identifier to a directory.
pub fn resolve_module_dir(module_id: &str, search_path: &[PathBuf]) -> RegistryResult<PathBuf> {
    let literal = PathBuf::from(module_id);
    let mut searched = vec![literal.clone()];
    if !module_id.is_empty() && literal.is_dir() {
        return Ok(literal);
    }

    let relative: PathBuf = module_id.split('.').collect();
    if !module_id.is_empty() && module_id.split('.').all(|part| !part.is_empty()) {
        for root in search_path {
            let candidate = root.join(&relative);
            if candidate.is_dir() {
                return Ok(candidate);
            }
            searched.push(candidate);
        }
    }

    Err(RegistryError::ModuleNotFound {
        module_id: module_id.to_string(),
        searched,
    })
}
