//! Tracing setup shared by the `mash` binary and the tests.
//!
//! Events go to stderr so stdout carries nothing but the result table.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the subscriber at WARN: substituted inputs and unachievable
/// infusions are shown, routine recomputes are not
pub fn init() {
    init_with_level("warn")
}

/// Install the subscriber at `default_level`; `RUST_LOG` wins when set
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Route debug events into the test harness output; safe to call repeatedly
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
