//! Operator-facing advisory: input checking and the headline recommendation
//!
//! The matcher is total over finite readings. Everything that can go wrong
//! with operator input is handled here, before a [`Reading`] exists:
//! missing values are refused, non-finite values are refused, and values
//! outside the operating envelope are accepted with a warning.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::OperatingEnvelope;
use crate::matcher::ProfileTable;
use crate::types::{Dimension, MatchResult, Reading};

/// Message shown when any of the three measurements is absent.
pub const MISSING_INPUT_MESSAGE: &str = "Please enter values for all three parameters.";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("{} Missing: {}", MISSING_INPUT_MESSAGE, join_dimensions(.0))]
    Missing(Vec<Dimension>),

    #[error("{0} must be a finite number")]
    NonFinite(Dimension),
}

fn join_dimensions(dims: &[Dimension]) -> String {
    dims.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Raw operator input; any field may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementInput {
    #[serde(default)]
    pub thrust_kn: Option<f64>,
    #[serde(default)]
    pub torque_knm: Option<f64>,
    #[serde(default)]
    pub speed_rpm: Option<f64>,
}

impl MeasurementInput {
    pub const fn new(thrust_kn: Option<f64>, torque_knm: Option<f64>, speed_rpm: Option<f64>) -> Self {
        Self {
            thrust_kn,
            torque_knm,
            speed_rpm,
        }
    }

    const fn get(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Thrust => self.thrust_kn,
            Dimension::Torque => self.torque_knm,
            Dimension::Speed => self.speed_rpm,
        }
    }

    /// Convert to a matcher reading, refusing missing or non-finite values.
    pub fn into_reading(self) -> Result<Reading, InputError> {
        let missing: Vec<_> = Dimension::ALL
            .into_iter()
            .filter(|&d| self.get(d).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(InputError::Missing(missing));
        }

        let mut values = [0.0; 3];
        for d in Dimension::ALL {
            let v = self.get(d).unwrap_or_default();
            if !v.is_finite() {
                return Err(InputError::NonFinite(d));
            }
            values[d.index()] = v;
        }
        Ok(Reading::new(values[0], values[1], values[2]))
    }
}

/// Warnings for values outside the operator envelope.
pub fn envelope_warnings(envelope: &OperatingEnvelope, reading: &Reading) -> Vec<String> {
    Dimension::ALL
        .into_iter()
        .filter_map(|d| {
            let range = envelope.range(d);
            let value = reading.value(d);
            (!range.contains(value)).then(|| {
                format!(
                    "{d} {value} {} is outside the operating envelope {} {}",
                    d.unit(),
                    range,
                    d.unit()
                )
            })
        })
        .collect()
}

/// How the headline soil type was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    /// Reading lies inside every range of the matched profile
    Exact,
    /// No profile contains the reading; closest by normalized distance
    Nearest,
}

impl std::fmt::Display for MatchQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Nearest => write!(f, "nearest"),
        }
    }
}

/// Headline output: soil type and optimized penetration rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub soil_type: String,
    pub soil_group: String,
    /// Mean recommended penetration rate (mm/rev)
    pub penetration_rate_mm_per_rev: f64,
    /// Display string, two decimals
    pub penetration_rate: String,
    pub distance: f64,
    pub all_in_range: bool,
    pub quality: MatchQuality,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Recommendation {
    pub fn from_match(result: &MatchResult<'_>, warnings: Vec<String>) -> Self {
        Self {
            soil_type: result.soil_type().to_string(),
            soil_group: result.profile.group().to_string(),
            penetration_rate_mm_per_rev: result.rop_mean,
            penetration_rate: format_penetration_rate(result.rop_mean),
            distance: result.distance,
            all_in_range: result.all_in_range,
            quality: if result.all_in_range {
                MatchQuality::Exact
            } else {
                MatchQuality::Nearest
            },
            warnings,
        }
    }
}

pub fn format_penetration_rate(rop_mm_per_rev: f64) -> String {
    format!("{rop_mm_per_rev:.2} mm/rev")
}

/// Full advisory flow: check input, match, attach envelope warnings.
pub fn recommend(
    table: &ProfileTable,
    envelope: &OperatingEnvelope,
    input: MeasurementInput,
) -> Result<Recommendation, InputError> {
    let reading = input.into_reading()?;
    let result = table.match_reading(&reading);
    let warnings = envelope_warnings(envelope, &reading);
    tracing::debug!(
        reading = %reading,
        soil_type = %result.soil_type(),
        distance = result.distance,
        all_in_range = result.all_in_range,
        "Soil type matched"
    );
    Ok(Recommendation::from_match(&result, warnings))
}
