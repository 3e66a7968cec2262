//! Tracing initialisation for notisync consumers.
//!
//! The engine itself only emits `tracing` events (see [`crate::obs`]);
//! wiring a subscriber is the embedding application's choice. Call
//! [`init_tracing`] (or [`init_tracing_from_env`]) once at program start
//! to install a global subscriber with an `EnvFilter`.
//!
//! Safe to call more than once: the global subscriber can only be set once
//! per process, so later calls are silently ignored.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// * `json` — when `true`, emit newline-delimited JSON log lines for log
///   aggregation pipelines; otherwise human-readable lines.
/// * `level` — default verbosity when `RUST_LOG` is not set.
///
/// `RUST_LOG` always wins for fine-grained filtering.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

/// [`init_tracing`] driven by `NOTISYNC_LOG_FORMAT` (`json` selects JSON
/// output) with an `info` default level.
pub fn init_tracing_from_env() {
    let json = std::env::var("NOTISYNC_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    init_tracing(json, Level::INFO);
}
