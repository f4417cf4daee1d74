//! Request tracing settings fixed at startup.

use std::{sync::OnceLock, time::Duration};

use crate::config::ServerConfig;

static RUNTIME: OnceLock<RuntimeSettings> = OnceLock::new();

/// What the request middleware needs from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct RuntimeSettings {
    /// Requests slower than this are logged as warnings.
    pub(super) slow_request_threshold: Duration,

    /// Adopt the caller's `traceparent` as the request span parent.
    pub(super) propagate_parent: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            slow_request_threshold: Duration::from_secs(1),
            propagate_parent: false,
        }
    }
}

impl From<&ServerConfig> for RuntimeSettings {
    fn from(config: &ServerConfig) -> Self {
        let tracing = &config.tracing;

        Self {
            slow_request_threshold: Duration::from_millis(config.logging.slow_request_threshold_ms),
            propagate_parent: tracing.otel_enabled && tracing.otel_parent_propagation_enabled,
        }
    }
}

/// Record settings for the lifetime of the process. Later calls are ignored.
pub(super) fn apply_runtime_config(config: &ServerConfig) {
    _ = RUNTIME.set(RuntimeSettings::from(config));
}

/// Settings in force, or the defaults before startup has applied any.
pub(super) fn current() -> RuntimeSettings {
    RUNTIME.get().copied().unwrap_or_default()
}
