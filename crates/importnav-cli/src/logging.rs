//! Logging initialization for the CLI.
//!
//! Logging is owned by the CLI crate to keep library crates lightweight.
//! Logs always go to stderr so stdout stays reserved for command output.

use importnav_core::config::{env_flag, DEBUG_ENV};
use tracing::Level;
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber.
///
/// # Arguments
/// * `verbosity` - 0 = WARN, 1 = DEBUG, 2+ = TRACE
/// * `json` - If true, output JSON lines to stderr
///
/// Setting `IMPORTNAV_DEBUG` forces resolver tracing on regardless of
/// verbosity.
///
/// JSON output format:
/// ```json
/// {"timestamp":"...","level":"DEBUG","fields":{"message":"...","spec":"@/util"},"target":"importnav_core::resolver::engine"}
/// ```
pub fn init(verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Support RUST_LOG env var, with verbosity flag as override
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    for target in ["importnav", "importnav_core"] {
        if let Some(d) = directive(&format!("{target}={level}")) {
            filter = filter.add_directive(d);
        }
    }
    if std::env::var(DEBUG_ENV).is_ok_and(|v| env_flag(&v)) {
        if let Some(d) = directive("importnav_core=trace") {
            filter = filter.add_directive(d);
        }
    }

    let subscriber = tracing_subscriber::registry().with(filter);

    // try_init: a second call (tests) is a no-op rather than a panic
    if json {
        let _ = subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init();
    } else {
        let _ = subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init();
    }
}

fn directive(s: &str) -> Option<Directive> {
    s.parse().ok()
}
