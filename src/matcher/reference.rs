//! Built-in soil reference table
//!
//! Nine soil categories observed on basalt / volcanic-breccia tunnel drives.
//! Units: thrust kN, torque kNm, cutter speed rpm, ROP mm/rev.

use crate::types::{ParameterRange, SoilProfile};

/// (name, group, thrust, torque, speed, rop) as `(min, max)` pairs
type Row = (
    &'static str,
    &'static str,
    (f64, f64),
    (f64, f64),
    (f64, f64),
    (f64, f64),
);

const ROWS: [Row; 9] = [
    ("Altered Basalt (A. Basalt)", "Weathered Rock", (3460.0, 3839.0), (427.0, 427.0), (4.0, 4.3), (6.78, 6.98)),
    ("Basalt mixed with Volcanic Breccia", "Mixed Rock", (4656.0, 4656.0), (352.0, 372.0), (4.24, 4.7), (4.09, 5.77)),
    ("Compact Basalt + Weathered Basalt", "Hard Rock", (3254.0, 3973.0), (372.0, 400.0), (3.64, 4.55), (6.06, 6.94)),
    ("Moderately Weathered Basalt (WB)", "Weathered Rock", (3585.0, 3585.0), (439.0, 595.0), (2.85, 4.19), (7.07, 7.74)),
    ("Slightly Weathered Basalt (SWBR)", "Hard Rock", (2999.0, 3810.0), (460.0, 528.0), (3.03, 4.5), (8.06, 8.9)),
    ("Volcanic Breccia (VB)", "Breccia", (3301.0, 3823.0), (371.0, 392.0), (3.18, 4.43), (6.78, 7.54)),
    ("Volcanic Tuff (VT)", "Tuff/Soft Rock", (3345.0, 4390.0), (497.0, 564.0), (3.39, 3.92), (4.23, 6.39)),
    ("Weathered Volcanic Breccia (WVB)", "Weathered Breccia", (3432.0, 3793.0), (369.0, 455.0), (4.11, 4.62), (8.07, 9.33)),
    ("Weathered Volcanic Tuff (WVT)", "Tuff/Soft Rock", (3185.0, 3437.0), (272.0, 483.0), (3.68, 3.91), (6.38, 6.53)),
];

fn range((min, max): (f64, f64)) -> ParameterRange {
    ParameterRange::new(min, max)
}

/// The built-in profiles in their fixed table order.
pub fn builtin_profiles() -> Vec<SoilProfile> {
    ROWS.iter()
        .map(|&(name, group, thrust, torque, speed, rop)| {
            SoilProfile::new(name, group, range(thrust), range(torque), range(speed), range(rop))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimension;

    #[test]
    fn test_builtin_has_nine_rows() {
        assert_eq!(builtin_profiles().len(), 9);
    }

    #[test]
    fn test_builtin_ranges_ordered() {
        for p in builtin_profiles() {
            for d in Dimension::ALL {
                let r = p.range(d);
                assert!(r.min <= r.max, "{} {} inverted", p.name(), d);
            }
            assert!(p.rop_range().min <= p.rop_range().max);
        }
    }

    #[test]
    fn test_builtin_names_unique() {
        let profiles = builtin_profiles();
        let names: std::collections::HashSet<_> = profiles.iter().map(SoilProfile::name).collect();
        assert_eq!(names.len(), profiles.len());
    }
}
