//! Logging initialization for hookctl.
//!
//! Configures the `tracing` subscriber with level filtering via the
//! `HOOKCTL_LOG` environment variable, falling back to the configured
//! `[log] level`. Log records from `hook-kit` (which uses the `log` facade)
//! are bridged into the same subscriber.
//!
//! # Usage
//!
//! ```bash
//! # Default (warn level)
//! hookctl validate
//!
//! # Show which commands the validator runs
//! HOOKCTL_LOG=debug hookctl validate .claude/hooks/guard.sh
//!
//! # Module-specific filtering
//! HOOKCTL_LOG=hook_kit=trace,warn hookctl validate --project
//! ```

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::schema::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "HOOKCTL_LOG";

/// Filter from `HOOKCTL_LOG`, or `fallback` when unset or invalid.
pub fn filter(fallback: LogLevel) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback.as_directive()))
}

/// Initialize the tracing subscriber.
///
/// Output is written to stderr so reports on stdout stay machine-readable.
///
/// # Panics
///
/// Panics if a global subscriber has already been set (call once, at startup).
pub fn init(fallback: LogLevel) {
    fmt()
        .with_env_filter(filter(fallback))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn env_filter_parses_every_config_level() {
        let levels = [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ];
        for level in levels {
            let filter = EnvFilter::try_new(level.as_directive());
            assert!(filter.is_ok(), "failed to parse directive: {:?}", level);
        }
    }

    #[test]
    fn env_filter_parses_module_directive() {
        let filter = EnvFilter::try_new("hook_kit=debug,warn");
        assert!(filter.is_ok());
    }
}
