//! Per-query match output

use serde::Serialize;

use super::{Dimension, SoilProfile};

/// How one reading value relates to one profile range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub in_range: bool,
    /// Distance to the nearer bound in engineering units (0 when in range)
    pub distance: f64,
    /// `distance` divided by the table-wide span of this dimension
    pub normalized: f64,
}

/// Result of scoring a reading against one profile of a table.
///
/// Borrows the profile from the table it was produced by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult<'a> {
    /// Position of the profile in its table
    pub index: usize,
    pub profile: &'a SoilProfile,
    /// Mean recommended penetration rate (mm/rev)
    pub rop_mean: f64,
    /// Sum of normalized per-dimension distances
    pub distance: f64,
    /// True when the reading lies inside all three ranges
    pub all_in_range: bool,
    /// Thrust, torque, speed
    pub dimensions: [DimensionScore; 3],
}

impl MatchResult<'_> {
    pub fn soil_type(&self) -> &str {
        self.profile.name()
    }

    pub const fn dimension(&self, dimension: Dimension) -> &DimensionScore {
        &self.dimensions[dimension.index()]
    }

    /// Selection order: in-range profiles first, then smaller distance.
    ///
    /// Distances are compared with `total_cmp`, so the ordering is total even
    /// if a caller ignores the finite-input precondition.
    pub fn rank_cmp(&self, other: &Self) -> std::cmp::Ordering {
        (!self.all_in_range)
            .cmp(&!other.all_in_range)
            .then_with(|| self.distance.total_cmp(&other.distance))
    }
}
