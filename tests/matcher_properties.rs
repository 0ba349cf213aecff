//! Matcher Property Tests
//!
//! Scenario and property checks for the soil matcher against the built-in
//! table: totality, in-range dominance, inclusive bounds, determinism,
//! monotonicity and the degenerate-span guard.

use rand::{rngs::StdRng, Rng, SeedableRng};

use tbm_soil::types::{Dimension, ParameterRange, Reading, SoilProfile};
use tbm_soil::{find_soil_type, ProfileTable};

fn table() -> &'static ProfileTable {
    ProfileTable::builtin()
}

fn index_of(name: &str) -> usize {
    table()
        .profiles()
        .iter()
        .position(|p| p.name() == name)
        .unwrap()
}

/// Recompute a profile's total distance straight from the formula.
fn formula_distance(p: &SoilProfile, r: &Reading) -> f64 {
    let spans = table().spans();
    Dimension::ALL
        .iter()
        .map(|&d| {
            let range = p.range(d);
            let v = r.value(d);
            let dist = if v >= range.min && v <= range.max {
                0.0
            } else {
                (v - range.min).abs().min((v - range.max).abs())
            };
            dist / spans.get(d)
        })
        .sum()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_lower_bounds_of_weathered_basalt() {
    let m = find_soil_type(3585.0, 439.0, 2.85);
    assert_eq!(m.soil_type(), "Moderately Weathered Basalt (WB)");
    assert!(m.all_in_range);
    assert_eq!(m.distance, 0.0);
    assert!((m.rop_mean - 7.405).abs() < 1e-9);
}

#[test]
fn scenario_point_thrust_basalt_breccia() {
    let m = find_soil_type(4656.0, 362.0, 4.47);
    assert_eq!(m.soil_type(), "Basalt mixed with Volcanic Breccia");
    assert!(m.all_in_range);
    assert!((m.rop_mean - 4.93).abs() < 1e-9);
}

#[test]
fn scenario_outside_every_range_picks_formula_minimum() {
    let r = Reading::new(5000.0, 600.0, 5.0);
    let m = table().match_reading(&r);
    assert!(!m.all_in_range);

    let (best_idx, best_dist) = table()
        .profiles()
        .iter()
        .enumerate()
        .map(|(i, p)| (i, formula_distance(p, &r)))
        .fold((usize::MAX, f64::INFINITY), |acc, (i, d)| if d < acc.1 { (i, d) } else { acc });

    assert_eq!(m.index, best_idx);
    assert!((m.distance - best_dist).abs() < 1e-12);
    assert_eq!(m.soil_type(), "Volcanic Tuff (VT)");
    assert!((m.distance - 1.063_374).abs() < 1e-5);
    assert!((m.rop_mean - 5.31).abs() < 1e-9);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn totality_over_random_finite_readings() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..2_000 {
        let r = Reading::new(
            rng.gen_range(-10_000.0..20_000.0),
            rng.gen_range(-1_000.0..2_000.0),
            rng.gen_range(-10.0..20.0),
        );
        let m = table().match_reading(&r);
        assert!(m.index < table().len());
        assert!(m.distance >= 0.0);
        assert!(m.distance.is_finite());
        assert_eq!(m.profile, &table().profiles()[m.index]);
    }
}

#[test]
fn in_range_profile_beats_any_out_of_range_profile() {
    let r = Reading::new(3000.0, 500.0, 3.1);
    let m = table().match_reading(&r);
    assert!(m.all_in_range);
    assert_eq!(m.soil_type(), "Slightly Weathered Basalt (SWBR)");

    for other in table().rank(&r).iter().filter(|c| !c.all_in_range) {
        assert!(
            other.rank_cmp(&m) == std::cmp::Ordering::Greater,
            "{} should rank after {}",
            other.soil_type(),
            m.soil_type()
        );
    }
}

#[test]
fn in_range_profile_wins_regardless_of_table_position() {
    // "near" is listed first and misses only by a hair on speed.
    let wide = SoilProfile::new(
        "wide",
        "",
        ParameterRange::new(0.0, 1000.0),
        ParameterRange::new(0.0, 1000.0),
        ParameterRange::new(0.0, 10.0),
        ParameterRange::new(1.0, 2.0),
    );
    let near = SoilProfile::new(
        "near",
        "",
        ParameterRange::new(500.0, 600.0),
        ParameterRange::new(500.0, 600.0),
        ParameterRange::new(5.0, 6.0),
        ParameterRange::new(3.0, 4.0),
    );
    let t = ProfileTable::new(vec![near, wide]).unwrap();
    let m = t.match_reading(&Reading::new(550.0, 550.0, 4.999));
    assert_eq!(m.profile.name(), "wide");
    assert!(m.all_in_range);
}

#[test]
fn boundaries_are_inclusive_with_zero_distance() {
    for (i, p) in table().profiles().iter().enumerate() {
        for pick_max in [false, true] {
            let bound = |d: Dimension| {
                let r = p.range(d);
                if pick_max { r.max } else { r.min }
            };
            let r = Reading::new(
                bound(Dimension::Thrust),
                bound(Dimension::Torque),
                bound(Dimension::Speed),
            );
            let score = table().score(i, &r).unwrap();
            assert!(score.all_in_range, "{} at bounds", p.name());
            assert_eq!(score.distance, 0.0);
            for s in &score.dimensions {
                assert!(s.in_range);
                assert_eq!(s.distance, 0.0);
            }
        }
    }
}

#[test]
fn identical_input_identical_output() {
    let r = Reading::new(3400.0, 430.0, 3.9);
    let first = table().match_reading(&r);
    for _ in 0..50 {
        assert_eq!(table().match_reading(&r), first);
    }
}

#[test]
fn distance_never_decreases_moving_away_from_interval() {
    let base = Reading::new(3600.0, 420.0, 3.8);
    for (i, p) in table().profiles().iter().enumerate() {
        for d in Dimension::ALL {
            let range = *p.range(d);
            let step = table().spans().get(d) / 20.0;
            for direction in [-1.0, 1.0] {
                let start = if direction > 0.0 { range.max } else { range.min };
                let mut prev = 0.0;
                for k in 0..30 {
                    let v = start + direction * step * f64::from(k);
                    let mut values = [base.thrust_kn, base.torque_knm, base.speed_rpm];
                    values[d.index()] = v;
                    let r = Reading::new(values[0], values[1], values[2]);
                    let s = table().score(i, &r).unwrap();
                    let dist = s.dimension(d).distance;
                    assert!(
                        dist >= prev,
                        "{} {} distance fell from {} to {}",
                        p.name(),
                        d,
                        prev,
                        dist
                    );
                    prev = dist;
                }
            }
        }
    }
}

#[test]
fn degenerate_span_dimension_is_ignored() {
    let mk = |name: &str, thrust: (f64, f64)| {
        SoilProfile::new(
            name,
            "",
            ParameterRange::new(thrust.0, thrust.1),
            ParameterRange::new(400.0, 400.0),
            ParameterRange::new(3.5, 3.5),
            ParameterRange::new(5.0, 6.0),
        )
    };
    let t = ProfileTable::new(vec![mk("low", (1000.0, 2000.0)), mk("high", (3000.0, 4000.0))])
        .unwrap();
    assert_eq!(t.spans().torque_knm, 0.0);
    assert_eq!(t.spans().speed_rpm, 0.0);

    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let r = Reading::new(1500.0, rng.gen_range(-1e4..1e4), rng.gen_range(-1e2..1e2));
        for m in t.rank(&r) {
            assert_eq!(m.dimension(Dimension::Torque).normalized, 0.0);
            assert_eq!(m.dimension(Dimension::Speed).normalized, 0.0);
            assert!(m.distance.is_finite());
        }
        assert_eq!(t.match_reading(&r).profile.name(), "low");
    }
}

#[test]
fn exact_ties_resolve_to_table_order() {
    let a = SoilProfile::new(
        "A",
        "",
        ParameterRange::new(100.0, 200.0),
        ParameterRange::new(10.0, 20.0),
        ParameterRange::new(1.0, 2.0),
        ParameterRange::new(1.0, 1.0),
    );
    let b = SoilProfile::new(
        "B",
        "",
        *a.range(Dimension::Thrust),
        *a.range(Dimension::Torque),
        *a.range(Dimension::Speed),
        ParameterRange::new(9.0, 9.0),
    );

    let ab = ProfileTable::new(vec![a.clone(), b.clone()]).unwrap();
    let ba = ProfileTable::new(vec![b, a]).unwrap();
    let r = Reading::new(250.0, 25.0, 2.5);

    assert_eq!(ab.match_reading(&r).profile.name(), "A");
    assert_eq!(ba.match_reading(&r).profile.name(), "B");
    let ranked: Vec<_> = ab.rank(&r).iter().map(|m| m.profile.name().to_string()).collect();
    assert_eq!(ranked, vec!["A", "B"]);
}

#[test]
fn weathered_basalt_index_is_stable() {
    assert_eq!(index_of("Moderately Weathered Basalt (WB)"), 3);
    assert_eq!(find_soil_type(3585.0, 439.0, 2.85).index, 3);
}
