//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first parse raw TOML into `toml::Value`, walk the
//! key tree, compare against known field names, and emit warnings with
//! "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use crate::types::Dimension;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `TbmConfig`.
///
/// Array-of-table entries (`[[profile]]`) share one path per field, without
/// an index. Any new field added to `TbmConfig` must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [server]
        "server",
        "server.addr",
        // [envelope]
        "envelope",
        "envelope.thrust_kn",
        "envelope.thrust_kn.min",
        "envelope.thrust_kn.max",
        "envelope.torque_knm",
        "envelope.torque_knm.min",
        "envelope.torque_knm.max",
        "envelope.speed_rpm",
        "envelope.speed_rpm.min",
        "envelope.speed_rpm.max",
        // [[profile]]
        "profile",
        "profile.name",
        "profile.group",
        "profile.thrust_kn",
        "profile.thrust_kn.min",
        "profile.thrust_kn.max",
        "profile.torque_knm",
        "profile.torque_knm.min",
        "profile.torque_knm.max",
        "profile.speed_rpm",
        "profile.speed_rpm.min",
        "profile.speed_rpm.max",
        "profile.rop_mm_per_rev",
        "profile.rop_mm_per_rev.min",
        "profile.rop_mm_per_rev.max",
        // Written by `to_toml`, recomputed on load
        "profile.rop_mean",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// A table `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`. Tables
/// inside arrays are walked under the array's own path, so two `[[profile]]`
/// entries both report `profile.name`; duplicates are removed.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            match v {
                toml::Value::Table(_) => keys.extend(walk_toml_keys(v, &path)),
                toml::Value::Array(items) => {
                    for item in items.iter().filter(|i| i.is_table()) {
                        keys.extend(walk_toml_keys(item, &path));
                    }
                }
                _ => {}
            }
        }
    }
    let mut seen = HashSet::new();
    keys.retain(|k| seen.insert(k.clone()));
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the alphabetically first key so suggestions are stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist > 3 {
            continue;
        }
        let better = match best {
            None => true,
            Some((bk, bd)) => dist < bd || (dist == bd && k < bk),
        };
        if better {
            best = Some((k, dist));
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Derived Field Validation
// ============================================================================

/// Warn about `[[profile]]` entries whose written `rop_mean` disagrees with
/// the midpoint of `rop_mm_per_rev`.
///
/// `rop_mean` is always recomputed on load, so a hand-edited value would
/// otherwise be dropped silently.
pub fn validate_rop_means(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };
    let Some(profiles) = value.get("profile").and_then(toml::Value::as_array) else {
        return Vec::new();
    };

    profiles
        .iter()
        .enumerate()
        .filter_map(|(i, p)| {
            let given = as_number(p.get("rop_mean")?)?;
            let rop = p.get("rop_mm_per_rev")?;
            let midpoint = (as_number(rop.get("min")?)? + as_number(rop.get("max")?)?) / 2.0;
            if (given - midpoint).abs() <= ROP_MEAN_TOLERANCE {
                return None;
            }
            let name = p.get("name").and_then(toml::Value::as_str).unwrap_or("?");
            Some(ValidationWarning {
                field: format!("profile[{i}].rop_mean"),
                message: format!(
                    "Profile '{name}' rop_mean {given} differs from the rop_mm_per_rev midpoint {midpoint}; the midpoint is used"
                ),
                suggestion: None,
            })
        })
        .collect()
}

const ROP_MEAN_TOLERANCE: f64 = 1e-9;

#[allow(clippy::cast_precision_loss)]
fn as_number(v: &toml::Value) -> Option<f64> {
    match v {
        toml::Value::Float(f) => Some(*f),
        toml::Value::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed `TbmConfig`.
///
/// Returns (errors, warnings): errors are impossible values that must
/// prevent startup; warnings are suspicious but not fatal.
pub fn validate_physical_ranges(
    config: &super::TbmConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for d in Dimension::ALL {
        let r = config.envelope.range(d);
        let field = d.field_name();
        if !r.is_finite() {
            errors.push(format!("envelope.{field} bounds must be finite"));
            continue;
        }
        if r.min >= r.max {
            errors.push(format!(
                "envelope.{field} min ({}) must be less than max ({})",
                r.min, r.max
            ));
        }
        // Thrust, torque and speed are magnitudes
        if r.min < 0.0 {
            errors.push(format!(
                "envelope.{field} min ({}) cannot be negative",
                r.min
            ));
        }
    }

    let mut names = HashSet::new();
    for p in &config.profiles {
        if !names.insert(p.name()) {
            warnings.push(ValidationWarning {
                field: "profile.name".to_string(),
                message: format!("Duplicate profile name '{}'", p.name()),
                suggestion: None,
            });
        }

        // A profile the operator cannot reach from inside the envelope
        for d in Dimension::ALL {
            let r = p.range(d);
            let env = config.envelope.range(d);
            if r.max < env.min || r.min > env.max {
                warnings.push(ValidationWarning {
                    field: format!("profile.{}", d.field_name()),
                    message: format!(
                        "Profile '{}' {} range {} lies outside the operating envelope {}",
                        p.name(),
                        d.field_name(),
                        r,
                        env
                    ),
                    suggestion: None,
                });
            }
        }
    }

    if config.profiles.len() > 1 {
        for d in Dimension::ALL {
            let first = config.profiles[0].range(d);
            if config.profiles.iter().all(|p| p.range(d) == first) && first.width() == 0.0 {
                warnings.push(ValidationWarning {
                    field: format!("profile.{}", d.field_name()),
                    message: format!(
                        "Every profile has the same single-point {} range; this dimension will not discriminate",
                        d.field_name()
                    ),
                    suggestion: None,
                });
            }
        }
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TbmConfig;
    use crate::types::{ParameterRange, SoilProfile};

    fn profile(name: &str, torque: (f64, f64)) -> SoilProfile {
        SoilProfile::new(
            name,
            "",
            ParameterRange::new(3000.0, 4000.0),
            ParameterRange::new(torque.0, torque.1),
            ParameterRange::new(3.0, 4.0),
            ParameterRange::new(5.0, 6.0),
        )
    }

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("thrust_kn", "thrust_kn"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("torqe_knm", "torque_knm"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [envelope]
            thrust_kn = { min = 1.0, max = 2.0 }
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"envelope".to_string()));
        assert!(keys.contains(&"envelope.thrust_kn".to_string()));
        assert!(keys.contains(&"envelope.thrust_kn.min".to_string()));
    }

    #[test]
    fn test_walk_toml_keys_array_of_tables_deduplicated() {
        let toml: toml::Value = r#"
            [[profile]]
            name = "a"
            [[profile]]
            name = "b"
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert_eq!(keys.iter().filter(|k| *k == "profile.name").count(), 1);
    }

    #[test]
    fn test_typo_in_profile_field_suggests_fix() {
        let toml_str = r#"
[[profile]]
name = "Basalt"
torqe_knm = { min = 1.0, max = 2.0 }
"#;
        let warnings = validate_unknown_keys(toml_str);
        let w = warnings
            .iter()
            .find(|w| w.field == "profile.torqe_knm")
            .unwrap();
        assert_eq!(w.suggestion.as_deref(), Some("profile.torque_knm"));
    }

    #[test]
    fn test_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[server]
addr = "127.0.0.1:9000"

[envelope]
speed_rpm = { min = 2.5, max = 5.0 }
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {warnings:?}");
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_edited_rop_mean_warns() {
        let toml_str = r#"
[[profile]]
name = "Granite"
rop_mm_per_rev = { min = 2.0, max = 3.0 }
rop_mean = 2.9
"#;
        let warnings = validate_rop_means(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "profile[0].rop_mean");
        assert!(warnings[0].message.contains("Granite"));
    }

    #[test]
    fn test_matching_or_absent_rop_mean_is_silent() {
        let toml_str = r#"
[[profile]]
name = "Granite"
rop_mm_per_rev = { min = 2, max = 3 }
rop_mean = 2.5

[[profile]]
name = "Clay"
rop_mm_per_rev = { min = 10.0, max = 14.0 }
"#;
        assert!(validate_rop_means(toml_str).is_empty());
    }

    #[test]
    fn test_defaults_clean() {
        let (errors, warnings) = validate_physical_ranges(&TbmConfig::default());
        assert!(errors.is_empty(), "{errors:?}");
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn test_inverted_envelope_is_error() {
        let mut config = TbmConfig::default();
        config.envelope.speed_rpm = ParameterRange::new(5.0, 2.5);
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("envelope.speed_rpm")));
    }

    #[test]
    fn test_negative_envelope_is_error() {
        let mut config = TbmConfig::default();
        config.envelope.thrust_kn = ParameterRange::new(-10.0, 5000.0);
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("cannot be negative")));
    }

    #[test]
    fn test_duplicate_profile_name_warns() {
        let mut config = TbmConfig::default();
        config.profiles = vec![profile("Basalt", (300.0, 400.0)), profile("Basalt", (400.0, 500.0))];
        let (_, warnings) = validate_physical_ranges(&config);
        assert!(warnings.iter().any(|w| w.message.contains("Duplicate")));
    }

    #[test]
    fn test_profile_outside_envelope_warns() {
        let mut config = TbmConfig::default();
        config.profiles = vec![profile("Hot", (700.0, 800.0))];
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.field == "profile.torque_knm"));
    }

    #[test]
    fn test_single_point_shared_dimension_warns() {
        let mut config = TbmConfig::default();
        config.profiles = vec![profile("a", (400.0, 400.0)), profile("b", (400.0, 400.0))];
        let (_, warnings) = validate_physical_ranges(&config);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("will not discriminate")));
    }
}
