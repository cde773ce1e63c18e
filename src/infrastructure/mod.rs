//! Infrastructure layer
//!
//! This module contains external integrations and adapters.

mod config;
mod exporter;
mod logging;
mod travis;

pub use config::{CONFIG_FILE, Config, ConfigError};
pub use exporter::{CiProvider, Exporter, exporter_for};
pub use logging::{DEBUG_ENV, debug_requested, init_logging};
pub use travis::{TravisCache, TravisConfig, TravisExporter};
