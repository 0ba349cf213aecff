//! Soil profile reference types

use serde::{Deserialize, Serialize};

use super::Dimension;

/// Closed interval `[min, max]` for an operating parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
}

impl ParameterRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Inclusive containment: both bounds count as inside.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Distance from `value` to the nearer bound, or 0 when inside.
    pub fn distance_to(&self, value: f64) -> f64 {
        if self.contains(value) {
            return 0.0;
        }
        (value - self.min).abs().min((value - self.max).abs())
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

impl std::fmt::Display for ParameterRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Raw profile row as written in `tbm_config.toml`.
#[derive(Debug, Clone, Deserialize)]
struct SoilProfileRow {
    name: String,
    #[serde(default)]
    group: String,
    thrust_kn: ParameterRange,
    torque_knm: ParameterRange,
    speed_rpm: ParameterRange,
    rop_mm_per_rev: ParameterRange,
}

impl From<SoilProfileRow> for SoilProfile {
    fn from(row: SoilProfileRow) -> Self {
        Self::new(
            row.name,
            row.group,
            row.thrust_kn,
            row.torque_knm,
            row.speed_rpm,
            row.rop_mm_per_rev,
        )
    }
}

/// One geological category with its expected TBM operating window.
///
/// `rop_mean` is derived from `rop_mm_per_rev` at construction and cannot be
/// set independently, so it is always the midpoint of the ROP range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SoilProfileRow")]
pub struct SoilProfile {
    name: String,
    group: String,
    thrust_kn: ParameterRange,
    torque_knm: ParameterRange,
    speed_rpm: ParameterRange,
    rop_mm_per_rev: ParameterRange,
    rop_mean: f64,
}

impl SoilProfile {
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        thrust_kn: ParameterRange,
        torque_knm: ParameterRange,
        speed_rpm: ParameterRange,
        rop_mm_per_rev: ParameterRange,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            thrust_kn,
            torque_knm,
            speed_rpm,
            rop_mean: rop_mm_per_rev.midpoint(),
            rop_mm_per_rev,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Operating range for one matched dimension.
    pub const fn range(&self, dimension: Dimension) -> &ParameterRange {
        match dimension {
            Dimension::Thrust => &self.thrust_kn,
            Dimension::Torque => &self.torque_knm,
            Dimension::Speed => &self.speed_rpm,
        }
    }

    pub const fn rop_range(&self) -> &ParameterRange {
        &self.rop_mm_per_rev
    }

    /// Mean recommended penetration rate (mm/rev).
    pub const fn rop_mean(&self) -> f64 {
        self.rop_mean
    }
}
