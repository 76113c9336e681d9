use std::io::{self, Write};
use std::process;

use colored::*;

use dispatchkit::cli::{unicode_args, Dispatcher};
use dispatchkit::command::ConstructorTable;
use dispatchkit::config::{DriverSettings, EnvironmentLoader};
use dispatchkit::executor::executor_for;
use dispatchkit::observability::init_logging;
use dispatchkit::registry::TomlRegistryLoader;

fn main() {
    let env = EnvironmentLoader::from_env();
    let settings = match DriverSettings::load(&env) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    init_logging(&settings.logging);
    tracing::debug!(?settings, "loaded settings");

    let loader = TomlRegistryLoader::new(
        settings.driver.command_path.clone(),
        ConstructorTable::builtin(),
    );
    let dispatcher = Dispatcher::new(
        Box::new(loader),
        executor_for(&settings.profiling),
        settings.driver,
    );

    let args = match unicode_args(std::env::args_os().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(e.exit_code());
        }
    };

    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();

    let code = dispatcher.run(args, &mut out, &mut err);

    let _ = out.flush();
    let _ = err.flush();
    process::exit(code);
}
