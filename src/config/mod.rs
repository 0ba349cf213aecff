//! TBM Configuration Module
//!
//! Operator-tunable settings loaded from TOML: server address, the operating
//! envelope used for input warnings, and an optional replacement soil table.
//!
//! ## Loading Order
//!
//! 1. `--config <path>` on the command line (a broken file is fatal)
//! 2. `TBM_CONFIG` environment variable (path to TOML file)
//! 3. `tbm_config.toml` in the current working directory
//! 4. Built-in defaults (nine-profile reference table)
//!
//! ## Usage
//!
//! ```ignore
//! // In main():
//! config::init(TbmConfig::load(None)?);
//!
//! // Anywhere else:
//! let addr = &config::get().server.addr;
//! ```

mod tbm_config;
pub mod defaults;
pub mod validation;

pub use tbm_config::*;

use std::sync::OnceLock;

/// Global configuration, initialized once at startup.
static TBM_CONFIG: OnceLock<TbmConfig> = OnceLock::new();

/// Initialize the global configuration.
///
/// Only the first call takes effect.
pub fn init(config: TbmConfig) {
    if TBM_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get the global configuration.
///
/// Falls back to built-in defaults when `init()` was never called.
pub fn get() -> &'static TbmConfig {
    TBM_CONFIG.get_or_init(TbmConfig::default)
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    TBM_CONFIG.get().is_some()
}
