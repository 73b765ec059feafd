//! Tracing subscriber initialization with structured logging.
//!
//! # Usage
//!
//! ```no_run
//! frontis_observe::tracing_setup::init_tracing("frontis=info", false).unwrap();
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global tracing subscriber.
///
/// - Installs a structured `fmt` layer with target visibility and span
///   close timing; `json` switches it to line-delimited JSON output for
///   log shippers.
/// - Filter precedence: `FRONTIS_LOG`, then `RUST_LOG`, then the
///   configured `default_filter`.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or the
/// filter directive does not parse.
pub fn init_tracing(
    default_filter: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = filter_from_env(default_filter)?;

    if json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

fn filter_from_env(default_filter: &str) -> Result<EnvFilter, Box<dyn std::error::Error>> {
    let directive = std::env::var("FRONTIS_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_filter.to_string());
    Ok(EnvFilter::try_new(directive)?)
}
