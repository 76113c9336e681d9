//! Observability utilities.
//!
//! The crate emits `tracing` events at its seams (argument preprocessing,
//! registry discovery, dispatch decisions, command load failures and phase
//! timings). Binaries install a subscriber once at startup.
//!
//! # Example
//!
//! ```no_run
//! use dispatchkit::config::LoggingConfig;
//! use dispatchkit::observability::init_logging;
//!
//! init_logging(&LoggingConfig {
//!     filter: "dispatchkit=debug".to_string(),
//! });
//! tracing::debug!("ready");
//! ```

pub mod logger;

pub use logger::{env_filter, init_logging};
