//! TBM Soil: soil-type matching for tunnel boring machines
//!
//! Matches observed TBM operating parameters (thrust, torque, cutter speed)
//! against a table of geological soil profiles and reports the best-matching
//! soil type with its mean recommended penetration rate.
//!
//! ## Architecture
//!
//! - **Matcher**: pure nearest-range classifier over an immutable profile table
//! - **Advisory**: operator input checks and the headline recommendation
//! - **Config**: TOML settings, optional replacement soil table
//! - **Ingest**: CSV logs of readings for batch classification
//! - **API**: JSON endpoints over the same advisory flow
//!
//! ```
//! let m = tbm_soil::find_soil_type(3585.0, 439.0, 2.85);
//! assert_eq!(m.soil_type(), "Moderately Weathered Basalt (WB)");
//! assert!(m.all_in_range);
//! ```

pub mod advisory;
pub mod api;
pub mod config;
pub mod ingest;
pub mod matcher;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, OperatingEnvelope, TbmConfig};

// Re-export commonly used types
pub use types::{Dimension, DimensionScore, MatchResult, ParameterRange, Reading, SoilProfile};

// Re-export matcher
pub use matcher::{find_soil_type, DimensionSpans, ProfileTable, TableError};

// Re-export advisory
pub use advisory::{InputError, MatchQuality, MeasurementInput, Recommendation};
