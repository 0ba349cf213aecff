//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Configuration
// ============================================================================

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "TBM_CONFIG";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tbm_config.toml";

// ============================================================================
// Operating envelope (operator input limits)
// ============================================================================

/// Thrust input limits (kN).
pub const ENVELOPE_THRUST_KN: (f64, f64) = (2500.0, 5000.0);

/// Torque input limits (kNm).
pub const ENVELOPE_TORQUE_KNM: (f64, f64) = (250.0, 600.0);

/// Cutter speed input limits (rpm).
pub const ENVELOPE_SPEED_RPM: (f64, f64) = (2.5, 5.0);

// ============================================================================
// HTTP server
// ============================================================================

/// Default bind address for `serve`.
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";

/// Comma-separated list of allowed CORS origins.
pub const CORS_ORIGINS_ENV_VAR: &str = "TBM_CORS_ORIGINS";

/// Request bodies are three numbers; anything near this size is abuse.
pub const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

// ============================================================================
// Logging
// ============================================================================

/// Set to `json` for structured JSON log lines.
pub const LOG_FORMAT_ENV_VAR: &str = "TBM_LOG_FORMAT";
