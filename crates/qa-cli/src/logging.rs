//! Diagnostic tracing for the form engine.
//!
//! Prompts and answers go to stdout; tracing goes to stderr so it never
//! mixes with the collected record.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Reads `RUST_LOG`; defaults to `warn`, or `debug` with `--verbose`.
pub fn init(verbose: bool) {
    let fallback = if verbose { "qa_form=debug,qa_form_cli=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
