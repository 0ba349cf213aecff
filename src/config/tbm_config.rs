//! TBM Configuration - server, operating envelope and soil table as TOML
//!
//! Every section implements `Default`, so an empty or missing file yields the
//! built-in behavior: the nine-profile reference table and the operator input
//! limits of the operator advisory screen.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;
use crate::matcher::{ProfileTable, TableError};
use crate::types::{Dimension, ParameterRange, SoilProfile};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `TbmConfig::load()` which searches:
/// 1. An explicit path (CLI `--config`)
/// 2. `$TBM_CONFIG`
/// 3. `./tbm_config.toml`
/// 4. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TbmConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Operator input limits (warnings only)
    #[serde(default)]
    pub envelope: OperatingEnvelope,

    /// Replacement soil table; empty means the built-in table
    #[serde(default, rename = "profile", skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<SoilProfile>,
}

impl TbmConfig {
    /// Load configuration using the standard search order.
    ///
    /// An explicit path is authoritative: if it cannot be loaded the error is
    /// returned. A broken `$TBM_CONFIG` or `./tbm_config.toml` is logged and
    /// the search continues with the next source.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        // 1. Explicit path
        if let Some(p) = explicit {
            let config = Self::load_from_file(p)?;
            info!(path = %p.display(), profiles = config.profiles.len(), "Loaded config from --config");
            return Ok(config);
        }

        // 2. Env var
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), profiles = config.profiles.len(), "Loaded config from TBM_CONFIG");
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from TBM_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "TBM_CONFIG points to non-existent file, falling back");
            }
        }

        // 3. ./tbm_config.toml
        let local = PathBuf::from(defaults::DEFAULT_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(profiles = config.profiles.len(), "Loaded config from ./tbm_config.toml");
                    return Ok(config);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./tbm_config.toml, using defaults");
                }
            }
        }

        // 4. Defaults
        info!("No tbm_config.toml found, using built-in defaults");
        Ok(Self::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings and never fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }
        for w in super::validation::validate_rop_means(contents) {
            warn!(field = %w.field, "{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;

        let (_, warnings) = super::validation::validate_physical_ranges(&config);
        for w in &warnings {
            warn!(field = %w.field, "{}", w);
        }
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate the whole config.
    ///
    /// Rules:
    /// - Server address must be non-empty `host:port`
    /// - Envelope bounds must be finite with min < max
    /// - Configured profiles must form a valid table
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.addr.trim().is_empty() || !self.server.addr.contains(':') {
            errors.push(format!(
                "server.addr '{}' must be in host:port form",
                self.server.addr
            ));
        }

        let (range_errors, _) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);

        if !self.profiles.is_empty() {
            if let Err(e) = ProfileTable::new(self.profiles.clone()) {
                errors.push(e.to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Build the active soil table: configured profiles, or the built-in table.
    pub fn build_table(&self) -> Result<Arc<ProfileTable>, ConfigError> {
        if self.profiles.is_empty() {
            return Ok(Arc::new(ProfileTable::builtin().clone()));
        }
        Ok(Arc::new(ProfileTable::new(self.profiles.clone())?))
    }
}

// ============================================================================
// Sections
// ============================================================================

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for `serve`
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::DEFAULT_SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

/// Input limits of the operator screen.
///
/// Readings outside these limits still match; the presentation layer only
/// attaches warnings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingEnvelope {
    #[serde(default = "default_envelope_thrust")]
    pub thrust_kn: ParameterRange,
    #[serde(default = "default_envelope_torque")]
    pub torque_knm: ParameterRange,
    #[serde(default = "default_envelope_speed")]
    pub speed_rpm: ParameterRange,
}

const fn default_envelope_thrust() -> ParameterRange {
    ParameterRange::new(defaults::ENVELOPE_THRUST_KN.0, defaults::ENVELOPE_THRUST_KN.1)
}

const fn default_envelope_torque() -> ParameterRange {
    ParameterRange::new(defaults::ENVELOPE_TORQUE_KNM.0, defaults::ENVELOPE_TORQUE_KNM.1)
}

const fn default_envelope_speed() -> ParameterRange {
    ParameterRange::new(defaults::ENVELOPE_SPEED_RPM.0, defaults::ENVELOPE_SPEED_RPM.1)
}

impl Default for OperatingEnvelope {
    fn default() -> Self {
        Self {
            thrust_kn: default_envelope_thrust(),
            torque_knm: default_envelope_torque(),
            speed_rpm: default_envelope_speed(),
        }
    }
}

impl OperatingEnvelope {
    pub const fn range(&self, dimension: Dimension) -> &ParameterRange {
        match dimension {
            Dimension::Thrust => &self.thrust_kn,
            Dimension::Torque => &self.torque_knm,
            Dimension::Speed => &self.speed_rpm,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),

    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Invalid soil table: {0}")]
    Table(#[from] TableError),
}
