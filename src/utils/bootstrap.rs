//! Bootstrap utilities for the funnel binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LOG_ENV_VAR;

/// Initialize tracing with the FUNNEL_LOG environment variable.
///
/// Defaults to "info" level if FUNNEL_LOG is not set; `verbose` forces
/// "debug". Output goes to stderr so command results on stdout stay clean.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // A test harness or embedding binary may already own the global subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
