//! Logging configuration
//!
//! Initializes tracing for the application. Events go to stderr so they do
//! not mix with the output of `print` commands and dumps.

/// Environment variable that turns on debug logging in the CLI
pub const DEBUG_ENV: &str = "PIPELYNE_DEBUG";

/// Initializes logging with the specified level.
///
/// `RUST_LOG` takes precedence over `level` when set. Calling this more than
/// once keeps the first subscriber.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .try_init();
}

/// Returns true if debug logging was requested through the environment
#[must_use]
pub fn debug_requested() -> bool {
    std::env::var_os(DEBUG_ENV).is_some_and(|value| !value.is_empty() && value != "0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging() {
        // Just verify it doesn't panic, even when called twice
        init_logging("debug");
        init_logging("info");
    }
}
