//! Tracing setup.
//!
//! The subscriber starts at [`DEFAULT_LEVEL`] so that config loading is
//! already logged, and switches to `logging.level` through a reload handle
//! once the config is known. `RUST_LOG`, when set, overrides both.

use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

pub const DEFAULT_LEVEL: &str = "info";

type FilterHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

static FILTER_HANDLE: OnceLock<FilterHandle> = OnceLock::new();

fn rust_log_set() -> bool {
    std::env::var_os("RUST_LOG").is_some()
}

pub fn init_tracing() {
    init_tracing_with_level(DEFAULT_LEVEL);
}

pub fn init_tracing_with_level(level: &str) {
    let filter = rust_log_set()
        .then(|| EnvFilter::try_from_default_env().ok())
        .flatten()
        .unwrap_or_else(|| EnvFilter::new(level));

    let (filter_layer, handle) = reload::Layer::new(filter);
    let _ = FILTER_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(false))
        .try_init();
}

/// Switches the active filter to `level`.
///
/// Does nothing when `RUST_LOG` is set or tracing was not initialized here.
pub fn apply_logging_level(level: &str) -> Result<(), String> {
    if rust_log_set() {
        return Ok(());
    }
    let filter = EnvFilter::try_new(level).map_err(|e| format!("invalid log level {level}: {e}"))?;
    if let Some(handle) = FILTER_HANDLE.get() {
        handle
            .modify(|current| *current = filter)
            .map_err(|e| format!("failed to apply log level: {e}"))?;
    }
    Ok(())
}
