//! Process-global request logging settings, fixed at startup.

use std::sync::OnceLock;

use crate::config::ServerConfig;

#[derive(Debug, Clone, Copy)]
pub(super) struct RuntimeSettings {
    pub(super) slow_request_threshold_ms: u64,

    /// Only meaningful when traces are exported.
    pub(super) otel_parent_propagation: bool,
}

const DEFAULTS: RuntimeSettings = RuntimeSettings {
    slow_request_threshold_ms: 1_000,
    otel_parent_propagation: false,
};

static SETTINGS: OnceLock<RuntimeSettings> = OnceLock::new();

pub(super) fn apply_runtime_config(config: &ServerConfig) {
    let observability = &config.observability;

    let settings = RuntimeSettings {
        slow_request_threshold_ms: observability.slow_request_threshold_ms,
        otel_parent_propagation: observability.propagates_parent(),
    };

    if SETTINGS.set(settings).is_err() {
        tracing::warn!("observability settings already applied, keeping the first");
    }
}

/// Settings applied at startup, or the defaults in tests.
pub(super) fn get() -> RuntimeSettings {
    SETTINGS.get().copied().unwrap_or(DEFAULTS)
}
