//! Shared utilities for the finance advisor
//!
//! Logging setup and the application-level configuration shared by the
//! workspace binaries.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError, LogFormat, load_json};
pub use logging::init_tracing;
