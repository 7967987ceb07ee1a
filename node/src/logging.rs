//! # Structured Logging
//!
//! Initializes the `tracing` subscriber for the service. Format is either
//! pretty-printed (development) or JSON lines (log aggregation); filtering
//! follows `RUST_LOG` when set, falling back to the given defaults.
//!
//! Output goes to stderr so stdout stays free for the `sign` subcommand's
//! structured output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for local development.
    Pretty,
    /// Machine-parseable JSON lines for production aggregation.
    Json,
}

impl LogFormat {
    /// Parse a format string. Accepts "json"; anything else is `Pretty`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Initialize the global tracing subscriber. Call once, early in `main()`.
///
/// `default_directives` applies when `RUST_LOG` is not set, e.g.
/// `"champz_node=info,champz_protocol=info"`.
pub fn init_logging(default_directives: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
                .init();
        }
    }

    tracing::info!("logging initialized (format={:?})", format);
}
