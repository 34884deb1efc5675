//! Diagnostic logging to stderr.
//!
//! Progress messages go to stdout with `println!`; this subscriber only
//! carries `tracing` events, filtered by `RUST_LOG` when it is set.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "warn";

/// Filter used by `--verbose` when `RUST_LOG` is unset.
const VERBOSE_FILTER: &str = "info,tsinstall=debug";

/// Installs the global subscriber. Does nothing if one is already set.
pub fn init_logging(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
