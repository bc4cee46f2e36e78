//! Logging setup for the command-line tool.
//!
//! Installs a global `tracing` subscriber writing to stderr so that rendered
//! tables on stdout stay clean. `RUST_LOG` takes precedence over the
//! verbosity flag.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Default filter directive for a `-v` count.
#[must_use]
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize the global subscriber.
///
/// Subsequent calls are no-ops. Failure to install (another subscriber is
/// already set) is returned so callers can continue without logging.
///
/// # Errors
///
/// Returns an error if a global subscriber was already installed elsewhere.
pub fn init(verbosity: u8) -> Result<(), tracing_subscriber::util::TryInitError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()?;

    let _ = INSTALLED.set(());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), "warn");
        assert_eq!(level_for_verbosity(1), "info");
        assert_eq!(level_for_verbosity(2), "debug");
        assert_eq!(level_for_verbosity(9), "trace");
    }

    #[test]
    fn test_init_is_idempotent() {
        // the first call may lose to another test's subscriber; the second must not fail
        let first = init(0);
        if first.is_ok() {
            assert!(init(2).is_ok());
        }
    }
}
