//! Logging & Request Observability Config

use std::time::Duration;

use clap::Args;

/// Log line layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// One human-readable line per event.
    Compact,

    /// One JSON object per event, with the active spans attached.
    Json,
}

/// Logging settings. `RUST_LOG`, when set, replaces the directives built
/// from these.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Level for storefront events (trace, debug, info, warn, error)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Level for sqlx statement logging
    #[arg(long, env = "SQLX_LOG_LEVEL", default_value = "warn")]
    pub sqlx_log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[must_use]
    pub fn directives(&self) -> String {
        format!(
            "{},h2=warn,hyper=warn,sqlx={}",
            self.log_level, self.sqlx_log_level
        )
    }
}

/// Request observability settings.
#[derive(Debug, Args)]
pub struct ObservabilityConfig {
    /// Requests slower than this many milliseconds are logged as warnings
    #[arg(long, env = "SLOW_REQUEST_THRESHOLD_MS", default_value_t = 1_000_u64)]
    pub slow_request_threshold_ms: u64,
}

impl ObservabilityConfig {
    #[must_use]
    pub fn slow_request_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_request_threshold_ms)
    }
}
