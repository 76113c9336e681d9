//! Structured logging setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::config::DEFAULT_LOG_FILTER;
use crate::config::LoggingConfig;

/// Build the filter for `directive`, falling back to the default level
/// when it does not parse.
pub fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("Warning: invalid log filter '{}': {}", directive, e);
        EnvFilter::new(DEFAULT_LOG_FILTER)
    })
}

/// Install the global subscriber: fmt output on standard error, filtered by
/// `config.filter`. Standard output stays reserved for command output.
///
/// Returns false when a subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(env_filter(&config.filter))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_directives() {
        assert_eq!(env_filter("debug").to_string().to_lowercase(), "debug");
        assert_eq!(
            env_filter("dispatchkit=notalevel").to_string().to_lowercase(),
            "warn"
        );
    }

    #[test]
    fn test_init_logging_only_once() {
        let config = LoggingConfig::default();
        init_logging(&config);
        assert!(!init_logging(&config));
        tracing::info!("logging initialized");
    }
}
