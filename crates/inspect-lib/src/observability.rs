//! Logging setup
//!
//! Logs go to stderr so stdout carries only command output (the JSON
//! passthrough in particular must not be interleaved with log lines).

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the `verbose` flag. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "warn");
        assert_eq!(default_filter(true), "debug");
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging(false);
        init_logging(true);
        tracing::debug!("still alive");
    }
}
