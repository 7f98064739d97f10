//! Tracing subscriber setup for hosts embedding the store.

use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

/// Install a global `tracing` subscriber. `RUST_LOG` wins over
/// `config.log_level`. Returns `false` if a subscriber was already set.
pub fn init_tracing(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let installed = if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };
    if installed.is_ok() {
        tracing::debug!(
            level = %config.log_level,
            json = config.json,
            "tracing subscriber installed"
        );
    }
    installed.is_ok()
}
