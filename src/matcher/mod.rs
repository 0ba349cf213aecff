//! Soil-type matcher
//!
//! Classifies a TBM reading against a table of soil profiles using a
//! nearest-range rule over three normalized dimensions:
//!
//! 1. Per dimension, the reading is either inside the profile range
//!    (distance 0, bounds inclusive) or at some distance from the nearer bound.
//! 2. Each distance is divided by the table-wide span of that dimension so
//!    thrust (kN), torque (kNm) and speed (rpm) become comparable.
//! 3. The three normalized distances are summed with equal weight.
//! 4. Profiles containing the reading on all three dimensions always win;
//!    otherwise the smallest total distance wins; exact ties go to the
//!    profile listed first.
//!
//! Matching is pure and allocation-light; a [`ProfileTable`] is immutable and
//! can be shared across threads freely.

mod reference;
mod table;

pub use reference::builtin_profiles;
pub use table::{DimensionSpans, ProfileTable, TableError};

use crate::types::{MatchResult, Reading};

/// Match a reading against the built-in soil table.
///
/// Precondition: all three values are finite.
pub fn find_soil_type(thrust_kn: f64, torque_knm: f64, speed_rpm: f64) -> MatchResult<'static> {
    ProfileTable::builtin().match_reading(&Reading::new(thrust_kn, torque_knm, speed_rpm))
}
