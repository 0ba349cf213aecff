//! Validated, immutable profile table and the matching rule

use std::sync::OnceLock;

use serde::Serialize;
use thiserror::Error;

use super::reference::builtin_profiles;
use crate::types::{Dimension, DimensionScore, MatchResult, Reading, SoilProfile};

/// Errors raised while building a [`ProfileTable`]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    #[error("Profile table must contain at least one profile")]
    Empty,

    #[error("Profile '{profile}': {dimension} range is inverted (min {min} > max {max})")]
    InvertedRange {
        profile: String,
        dimension: String,
        min: f64,
        max: f64,
    },

    #[error("Profile '{profile}': {field} contains a non-finite bound")]
    NonFinite { profile: String, field: String },
}

/// Table-wide span of each dimension: `max(max_d) - min(min_d)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionSpans {
    pub thrust_kn: f64,
    pub torque_knm: f64,
    pub speed_rpm: f64,
}

impl DimensionSpans {
    fn compute(profiles: &[SoilProfile]) -> Self {
        let span = |d: Dimension| {
            let lo = profiles.iter().map(|p| p.range(d).min).fold(f64::INFINITY, f64::min);
            let hi = profiles.iter().map(|p| p.range(d).max).fold(f64::NEG_INFINITY, f64::max);
            hi - lo
        };
        Self {
            thrust_kn: span(Dimension::Thrust),
            torque_knm: span(Dimension::Torque),
            speed_rpm: span(Dimension::Speed),
        }
    }

    pub const fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Thrust => self.thrust_kn,
            Dimension::Torque => self.torque_knm,
            Dimension::Speed => self.speed_rpm,
        }
    }

    /// Normalize a raw distance; a zero (degenerate) span contributes nothing.
    pub fn normalize(&self, dimension: Dimension, distance: f64) -> f64 {
        let span = self.get(dimension);
        if span > 0.0 {
            distance / span
        } else {
            0.0
        }
    }
}

/// Ordered, validated set of soil profiles with precomputed spans.
///
/// Construction is the only fallible step; matching never fails.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileTable {
    profiles: Vec<SoilProfile>,
    spans: DimensionSpans,
}

static BUILTIN_TABLE: OnceLock<ProfileTable> = OnceLock::new();

impl ProfileTable {
    /// Validate profiles and precompute dimension spans.
    pub fn new(profiles: Vec<SoilProfile>) -> Result<Self, TableError> {
        if profiles.is_empty() {
            return Err(TableError::Empty);
        }

        for p in &profiles {
            for d in Dimension::ALL {
                let r = p.range(d);
                if !r.is_finite() {
                    return Err(TableError::NonFinite {
                        profile: p.name().to_string(),
                        field: d.field_name().to_string(),
                    });
                }
                if r.min > r.max {
                    return Err(TableError::InvertedRange {
                        profile: p.name().to_string(),
                        dimension: d.field_name().to_string(),
                        min: r.min,
                        max: r.max,
                    });
                }
            }
            let rop = p.rop_range();
            if !rop.is_finite() {
                return Err(TableError::NonFinite {
                    profile: p.name().to_string(),
                    field: "rop_mm_per_rev".to_string(),
                });
            }
            if rop.min > rop.max {
                return Err(TableError::InvertedRange {
                    profile: p.name().to_string(),
                    dimension: "rop_mm_per_rev".to_string(),
                    min: rop.min,
                    max: rop.max,
                });
            }
        }

        let spans = DimensionSpans::compute(&profiles);
        Ok(Self { profiles, spans })
    }

    /// The built-in nine-profile table, built on first use and shared.
    pub fn builtin() -> &'static Self {
        BUILTIN_TABLE.get_or_init(|| {
            let profiles = builtin_profiles();
            Self {
                spans: DimensionSpans::compute(&profiles),
                profiles,
            }
        })
    }

    pub fn profiles(&self) -> &[SoilProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Always false for a constructed table; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub const fn spans(&self) -> &DimensionSpans {
        &self.spans
    }

    /// Score a reading against the profile at `index`.
    pub fn score(&self, index: usize, reading: &Reading) -> Option<MatchResult<'_>> {
        self.profiles
            .get(index)
            .map(|profile| self.score_profile(index, profile, reading))
    }

    fn score_profile<'a>(
        &'a self,
        index: usize,
        profile: &'a SoilProfile,
        reading: &Reading,
    ) -> MatchResult<'a> {
        let dimensions = Dimension::ALL.map(|d| {
            let range = profile.range(d);
            let value = reading.value(d);
            let distance = range.distance_to(value);
            DimensionScore {
                dimension: d,
                in_range: range.contains(value),
                distance,
                normalized: self.spans.normalize(d, distance),
            }
        });

        MatchResult {
            index,
            profile,
            rop_mean: profile.rop_mean(),
            distance: dimensions.iter().map(|s| s.normalized).sum(),
            all_in_range: dimensions.iter().all(|s| s.in_range),
            dimensions,
        }
    }

    fn scores(&self, reading: Reading) -> impl Iterator<Item = MatchResult<'_>> + '_ {
        self.profiles
            .iter()
            .enumerate()
            .map(move |(i, p)| self.score_profile(i, p, &reading))
    }

    /// Best-matching profile for a reading.
    ///
    /// Precondition: the reading is finite. Any finite reading produces a
    /// result, including readings outside every profile range.
    pub fn match_reading(&self, reading: &Reading) -> MatchResult<'_> {
        // `new` rejects empty tables, so index 0 always exists.
        let mut best = self.score_profile(0, &self.profiles[0], reading);
        for candidate in self.scores(*reading).skip(1) {
            // Strictly better only: the earliest profile keeps an exact tie.
            if candidate.rank_cmp(&best) == std::cmp::Ordering::Less {
                best = candidate;
            }
        }
        best
    }

    /// Every profile scored and stably sorted by selection order.
    pub fn rank(&self, reading: &Reading) -> Vec<MatchResult<'_>> {
        let mut ranked: Vec<_> = self.scores(*reading).collect();
        ranked.sort_by(|a, b| a.rank_cmp(b));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParameterRange;

    fn profile(name: &str, thrust: (f64, f64), torque: (f64, f64), speed: (f64, f64)) -> SoilProfile {
        SoilProfile::new(
            name,
            "",
            ParameterRange::new(thrust.0, thrust.1),
            ParameterRange::new(torque.0, torque.1),
            ParameterRange::new(speed.0, speed.1),
            ParameterRange::new(1.0, 2.0),
        )
    }

    #[test]
    fn test_builtin_spans() {
        let spans = ProfileTable::builtin().spans();
        assert!((spans.thrust_kn - 1657.0).abs() < 1e-9);
        assert!((spans.torque_knm - 323.0).abs() < 1e-9);
        assert!((spans.speed_rpm - 1.85).abs() < 1e-9);
    }

    #[test]
    fn test_empty_table_rejected() {
        assert_eq!(ProfileTable::new(vec![]).unwrap_err(), TableError::Empty);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = ProfileTable::new(vec![profile("bad", (10.0, 5.0), (1.0, 2.0), (1.0, 2.0))])
            .unwrap_err();
        assert!(matches!(err, TableError::InvertedRange { ref dimension, .. } if dimension == "thrust_kn"));
    }

    #[test]
    fn test_non_finite_bound_rejected() {
        let err = ProfileTable::new(vec![profile("nan", (1.0, 2.0), (f64::NAN, 2.0), (1.0, 2.0))])
            .unwrap_err();
        assert!(matches!(err, TableError::NonFinite { ref field, .. } if field == "torque_knm"));
    }

    #[test]
    fn test_degenerate_span_contributes_zero() {
        let table = ProfileTable::new(vec![
            profile("a", (100.0, 200.0), (5.0, 5.0), (1.0, 2.0)),
            profile("b", (300.0, 400.0), (5.0, 5.0), (3.0, 4.0)),
        ])
        .unwrap();
        assert_eq!(table.spans().torque_knm, 0.0);

        let r = table.match_reading(&Reading::new(150.0, 900.0, 1.5));
        let torque = r.dimension(Dimension::Torque);
        assert!(!torque.in_range);
        assert_eq!(torque.distance, 895.0);
        assert_eq!(torque.normalized, 0.0);
        assert_eq!(r.distance, 0.0);
        assert!(!r.all_in_range);
    }

    #[test]
    fn test_exact_tie_goes_to_first_profile() {
        let table = ProfileTable::new(vec![
            profile("first", (100.0, 200.0), (10.0, 20.0), (1.0, 2.0)),
            profile("second", (100.0, 200.0), (10.0, 20.0), (1.0, 2.0)),
        ])
        .unwrap();
        let inside = table.match_reading(&Reading::new(150.0, 15.0, 1.5));
        assert_eq!(inside.index, 0);
        let outside = table.match_reading(&Reading::new(900.0, 90.0, 9.0));
        assert_eq!(outside.index, 0);
    }

    #[test]
    fn test_rank_head_equals_match() {
        let table = ProfileTable::builtin();
        let reading = Reading::new(3700.0, 410.0, 4.2);
        let ranked = table.rank(&reading);
        assert_eq!(ranked.len(), table.len());
        assert_eq!(ranked[0], table.match_reading(&reading));
        for w in ranked.windows(2) {
            assert_ne!(w[0].rank_cmp(&w[1]), std::cmp::Ordering::Greater);
        }
    }

    #[test]
    fn test_score_out_of_bounds_index() {
        let table = ProfileTable::builtin();
        assert!(table.score(99, &Reading::new(1.0, 1.0, 1.0)).is_none());
        assert!(table.score(0, &Reading::new(1.0, 1.0, 1.0)).is_some());
    }
}
