//! Environment variable loading and management.
//!
//! Every variable the driver reads lives here so the rest of the crate
//! takes plain values.

use std::env;
use std::path::{Path, PathBuf};

/// Optional `.env` file loaded before anything else
pub const ENV_FILE_VAR: &str = "DISPATCHKIT_ENV_FILE";
/// Optional TOML settings file
pub const CONFIG_VAR: &str = "DISPATCHKIT_CONFIG";
/// Search roots for configuration module identifiers
pub const COMMAND_PATH_VAR: &str = "DISPATCHKIT_COMMAND_PATH";
/// Enables the profiling executor
pub const PROFILE_COMMAND_VAR: &str = "DISPATCHKIT_PROFILE_COMMAND";
/// Where profile stats are written
pub const PROFILE_DIR_VAR: &str = "DISPATCHKIT_PROFILE_DIR";
/// tracing filter directive
pub const LOG_VAR: &str = "DISPATCHKIT_LOG";

/// Loads environment variables from .env file and system environment.
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    env_file: Option<PathBuf>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to a .env file. Nothing is loaded when None.
    pub fn new(env_file: Option<&Path>) -> Self {
        // Only an explicit file is loaded, never a stray .env in the cwd.
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(e) = dotenv::from_path(path) {
                    eprintln!("Warning: Failed to load .env file: {}", e);
                }
            }
        }

        Self {
            env_file: env_file.map(Path::to_path_buf),
        }
    }

    /// Loader for the file named by `DISPATCHKIT_ENV_FILE`, if any.
    pub fn from_env() -> Self {
        let env_file = non_empty(ENV_FILE_VAR).map(PathBuf::from);
        Self::new(env_file.as_deref())
    }

    pub fn env_file(&self) -> Option<&Path> {
        self.env_file.as_deref()
    }

    pub fn config_file(&self) -> Option<PathBuf> {
        non_empty(CONFIG_VAR).map(PathBuf::from)
    }

    /// Search roots in platform path-list syntax.
    pub fn command_path(&self) -> Option<Vec<PathBuf>> {
        env::var_os(COMMAND_PATH_VAR)
            .filter(|v| !v.is_empty())
            .map(|v| env::split_paths(&v).collect())
    }

    /// `Some(false)` for `0`/`false`/`no`, `Some(true)` for any other
    /// non-empty value, `None` when unset.
    pub fn profile_command(&self) -> Option<bool> {
        non_empty(PROFILE_COMMAND_VAR).map(|v| {
            !matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            )
        })
    }

    pub fn profile_dir(&self) -> Option<PathBuf> {
        non_empty(PROFILE_DIR_VAR).map(PathBuf::from)
    }

    pub fn log_filter(&self) -> Option<String> {
        non_empty(LOG_VAR)
    }
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn test_profile_command_values() {
        let env_loader = EnvironmentLoader::default();

        env::remove_var(PROFILE_COMMAND_VAR);
        assert_eq!(env_loader.profile_command(), None);

        env::set_var(PROFILE_COMMAND_VAR, "1");
        assert_eq!(env_loader.profile_command(), Some(true));

        env::set_var(PROFILE_COMMAND_VAR, "False");
        assert_eq!(env_loader.profile_command(), Some(false));

        env::set_var(PROFILE_COMMAND_VAR, "");
        assert_eq!(env_loader.profile_command(), None);

        env::remove_var(PROFILE_COMMAND_VAR);
    }

    #[test]
    #[serial]
    fn test_command_path_split() {
        let a = PathBuf::from("/tmp/a");
        let b = PathBuf::from("/tmp/b");
        let joined = env::join_paths([&a, &b]).unwrap();
        env::set_var(COMMAND_PATH_VAR, &joined);

        let env_loader = EnvironmentLoader::default();
        assert_eq!(env_loader.command_path(), Some(vec![a, b]));

        env::remove_var(COMMAND_PATH_VAR);
        assert_eq!(env_loader.command_path(), None);
    }

    #[test]
    #[serial]
    fn test_env_file_loading() {
        let temp = tempdir().unwrap();
        let file = temp.path().join(".env");
        std::fs::write(&file, format!("{}=trace\n", LOG_VAR)).unwrap();
        env::remove_var(LOG_VAR);

        let env_loader = EnvironmentLoader::new(Some(&file));
        assert_eq!(env_loader.env_file(), Some(file.as_path()));
        assert_eq!(env_loader.log_filter(), Some("trace".to_string()));

        env::remove_var(LOG_VAR);
        assert!(EnvironmentLoader::new(None).env_file().is_none());
    }
}
