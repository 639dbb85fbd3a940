//! Logging setup (`tracing` + `tracing-subscriber`).
//!
//! Logs go to stderr so report output on stdout stays machine-readable.
//! `RUST_LOG` (e.g. `RUST_LOG=xy_fitconf=debug`) overrides the `-v` level.

use tracing_subscriber::{EnvFilter, fmt};

/// Filter directive for a `-v` count.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialise the global subscriber. Safe to call more than once.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbose)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}

/// Subscriber for tests: verbose, captured by the test harness.
#[cfg(test)]
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
