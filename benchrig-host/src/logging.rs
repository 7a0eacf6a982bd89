//! Logging initialisation
//!
//! Installs a `tracing-subscriber` fmt subscriber. `RUST_LOG` takes precedence
//! over the verbosity flag when set.

use tracing_subscriber::EnvFilter;

/// Default filter for `verbose`
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "benchrig=debug,benchrig_core=debug,benchrig_host=debug"
    } else {
        "benchrig=info,benchrig_core=info,benchrig_host=info"
    }
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed (e.g. by the
/// embedding application or a previous call).
pub fn init_logging(verbose: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
