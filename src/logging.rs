//! Structured logging setup.
//!
//! The engine emits `tracing` events: `debug` for configured models and
//! completed calculations, `trace` for every evaluated plan stage, `warn`
//! when an unstable system is refused. Nothing is printed until a
//! subscriber is installed.
//!
//! ```bash
//! RUST_LOG=queuecalc=trace queuecalc calc PICS --lambda 2 --mu 5
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_LEVEL: &str = "warn";

/// Install a stderr subscriber at the default level.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging() -> bool {
    init_logging_with_level(DEFAULT_LEVEL)
}

/// Install a stderr subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Calling this more than once is
/// harmless; later calls return `false`.
pub fn init_logging_with_level(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .try_init()
        .is_ok()
}

/// Level implied by the CLI verbosity flag.
#[must_use]
pub const fn level_for_verbosity(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        DEFAULT_LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(false), "warn");
        assert_eq!(level_for_verbosity(true), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        let _first = init_logging_with_level("debug");
        assert!(!init_logging());
    }
}
