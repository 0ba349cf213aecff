//! Operating-parameter dimensions and TBM readings

use serde::{Deserialize, Serialize};

/// One of the three matched operating parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Thrust,
    Torque,
    Speed,
}

impl Dimension {
    /// All dimensions in scoring order.
    pub const ALL: [Self; 3] = [Self::Thrust, Self::Torque, Self::Speed];

    /// Conventional engineering unit for this dimension.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Thrust => "kN",
            Self::Torque => "kNm",
            Self::Speed => "rpm",
        }
    }

    /// Field name used in config files, CSV headers and JSON bodies.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Thrust => "thrust_kn",
            Self::Torque => "torque_knm",
            Self::Speed => "speed_rpm",
        }
    }

    /// Index into `[thrust, torque, speed]` arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::Thrust => 0,
            Self::Torque => 1,
            Self::Speed => 2,
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Thrust => write!(f, "Thrust"),
            Self::Torque => write!(f, "Torque"),
            Self::Speed => write!(f, "Cutter Speed"),
        }
    }
}

/// A single TBM observation.
///
/// All three values are expected to be finite. Callers that accept user input
/// go through [`crate::advisory::MeasurementInput`], which rejects missing and
/// non-finite values before a `Reading` is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Thrust (kN)
    pub thrust_kn: f64,
    /// Cutterhead torque (kN·m)
    pub torque_knm: f64,
    /// Cutter speed (rpm)
    pub speed_rpm: f64,
}

impl Reading {
    pub const fn new(thrust_kn: f64, torque_knm: f64, speed_rpm: f64) -> Self {
        Self {
            thrust_kn,
            torque_knm,
            speed_rpm,
        }
    }

    pub const fn value(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Thrust => self.thrust_kn,
            Dimension::Torque => self.torque_knm,
            Dimension::Speed => self.speed_rpm,
        }
    }

    /// True when every value is a finite number.
    pub fn is_finite(&self) -> bool {
        Dimension::ALL.iter().all(|&d| self.value(d).is_finite())
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "thrust {:.0} kN, torque {:.0} kNm, speed {:.2} rpm",
            self.thrust_kn, self.torque_knm, self.speed_rpm
        )
    }
}
