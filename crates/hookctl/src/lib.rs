//! hookctl - command-line front end for `hook-kit`
//!
//! The binary lives in `main.rs`; this library holds the pieces that are
//! useful to test in isolation: the TOML configuration layer, logging setup
//! and report rendering.

/// TOML configuration loading from `$XDG_CONFIG_HOME/hookctl/config.toml`.
pub mod config;

/// `tracing` subscriber setup.
pub mod logging;

/// Human and JSON report rendering.
pub mod output;
