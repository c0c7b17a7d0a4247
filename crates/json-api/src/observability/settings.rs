//! Request logging settings fixed at startup.

use std::{sync::OnceLock, time::Duration};

use tracing::warn;

use crate::config::observability::ObservabilityConfig;

const DEFAULT_SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(1);

static SLOW_REQUEST_THRESHOLD: OnceLock<Duration> = OnceLock::new();

/// First call wins.
pub(super) fn configure(config: &ObservabilityConfig) {
    if SLOW_REQUEST_THRESHOLD
        .set(config.slow_request_threshold())
        .is_err()
    {
        warn!("slow request threshold already configured, keeping the first value");
    }
}

pub(super) fn slow_request_threshold() -> Duration {
    SLOW_REQUEST_THRESHOLD
        .get()
        .copied()
        .unwrap_or(DEFAULT_SLOW_REQUEST_THRESHOLD)
}
