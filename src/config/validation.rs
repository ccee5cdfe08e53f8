//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::defaults;
use crate::processing::PeakParams;

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

const PEAK_FIELDS: [&str; 4] = ["min_height", "min_distance", "min_prominence", "min_width"];

const PEAK_TABLES: [&str; 3] = ["road.bump_peaks", "road.pothole_peaks", "wind.peaks"];

/// Returns the complete set of valid dotted key paths for PipelineConfig.
///
/// Maintained by hand to match the struct hierarchy in pipeline_config.rs.
pub fn known_config_keys() -> HashSet<String> {
    let keys: &[&str] = &[
        // [road]
        "road",
        "road.pothole_max_z",
        "road.bump_min_z",
        // [humidex]
        "humidex",
        "humidex.comfortable_above",
        "humidex.some_discomfort_above",
        "humidex.great_discomfort_above",
        "humidex.dangerous_above",
        // [wind]
        "wind",
        "wind.chill_below",
        // [ingestion]
        "ingestion",
        "ingestion.user_id",
        "ingestion.batch_size",
        "ingestion.accelerometer_csv",
        "ingestion.gps_csv",
        "ingestion.humidex_csv",
        "ingestion.anemometer_csv",
        // [transmission]
        "transmission",
        "transmission.store_url",
        "transmission.timeout_secs",
    ];

    let mut known: HashSet<String> = keys.iter().map(|k| (*k).to_string()).collect();
    for table in PEAK_TABLES {
        known.insert(table.to_string());
        for field in PEAK_FIELDS {
            known.insert(format!("{table}.{field}"));
        }
    }
    known
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
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
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    if a.is_empty() {
        return b_len;
    }
    if b.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<String>) -> Option<String> {
    known
        .iter()
        .map(|k| (k, levenshtein(unknown, k)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by(|(ka, da), (kb, db)| da.cmp(db).then_with(|| ka.cmp(kb)))
        .map(|(k, _)| k.clone())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Partial Peak Tables
// ============================================================================

/// Built-in parameters of each peak table.
fn peak_table_defaults() -> [(&'static str, PeakParams); 3] {
    [
        ("road.bump_peaks", defaults::BUMP_PEAKS),
        ("road.pothole_peaks", defaults::POTHOLE_PEAKS),
        ("wind.peaks", defaults::WIND_PEAKS),
    ]
}

/// Warn about peak tables that leave out a limit which is on by default.
///
/// A peak table present in the file replaces the whole parameter set, and
/// an omitted field means "no limit", not "built-in limit".
pub fn validate_peak_tables(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let mut warnings = Vec::new();
    for (table_name, builtin) in peak_table_defaults() {
        let table = table_name
            .split('.')
            .try_fold(&value, |v, part| v.get(part))
            .and_then(toml::Value::as_table);
        let Some(table) = table else {
            continue;
        };

        let defaulted = [
            ("min_height", builtin.min_height.is_some()),
            ("min_distance", builtin.min_distance.is_some()),
            ("min_prominence", builtin.min_prominence.is_some()),
            ("min_width", builtin.min_width.is_some()),
        ];
        let dropped: Vec<&str> = defaulted
            .iter()
            .filter(|(field, on_by_default)| *on_by_default && !table.contains_key(*field))
            .map(|(field, _)| *field)
            .collect();

        if !dropped.is_empty() {
            warnings.push(ValidationWarning {
                field: table_name.to_string(),
                message: format!(
                    "[{table_name}] omits {}; omitted fields disable that limit instead of keeping the built-in value",
                    dropped.join(", ")
                ),
                suggestion: None,
            });
        }
    }
    warnings
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed PipelineConfig.
///
/// Returns (errors, warnings): errors are impossible values that must
/// prevent startup; warnings are suspicious but not fatal.
pub fn validate_physical_ranges(
    config: &super::PipelineConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Wind events below 0 m/s are meaningless and would feed the wind-chill
    // formula outside its domain.
    match config.wind.peaks.min_height {
        Some(h) if h < 0.0 => errors.push(format!(
            "wind.peaks.min_height = {h:.1} m/s cannot be negative"
        )),
        None => warnings.push(ValidationWarning {
            field: "wind.peaks.min_height".to_string(),
            message: "wind.peaks.min_height is unset: any gust, however weak, can be flagged as a wind event".to_string(),
            suggestion: None,
        }),
        Some(_) => {}
    }

    // Wind chill is only defined down to roughly -50 °C and stays below air
    // temperature, so a split outside this band is almost certainly a typo.
    let chill = config.wind.chill_below;
    if chill.is_finite() && !(-60.0..=10.0).contains(&chill) {
        warnings.push(ValidationWarning {
            field: "wind.chill_below".to_string(),
            message: format!("wind.chill_below = {chill:.1} °C is outside typical range (-60 to 10 °C)"),
            suggestion: None,
        });
    }

    // The bump peak floor below the streaming bump bound means the batch
    // policy is more permissive than the streaming one.
    if let Some(h) = config.road.bump_peaks.min_height {
        if h < config.road.bump_min_z {
            warnings.push(ValidationWarning {
                field: "road.bump_peaks.min_height".to_string(),
                message: format!(
                    "road.bump_peaks.min_height = {h:.0} is below road.bump_min_z = {:.0}",
                    config.road.bump_min_z
                ),
                suggestion: None,
            });
        }
    }

    // Pothole heights live on the negated z scale.
    if let Some(h) = config.road.pothole_peaks.min_height {
        if h > 0.0 {
            warnings.push(ValidationWarning {
                field: "road.pothole_peaks.min_height".to_string(),
                message: format!(
                    "road.pothole_peaks.min_height = {h:.0} is positive; it applies to the negated z series (use -15000 for z <= 15000)"
                ),
                suggestion: None,
            });
        }
    }

    if config.ingestion.user_id < 0 {
        errors.push(format!(
            "ingestion.user_id = {} cannot be negative",
            config.ingestion.user_id
        ));
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("hello", "hello"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("prominance", "prominence"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [road]
            [road.bump_peaks]
            min_width = 10.0
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"road".to_string()));
        assert!(keys.contains(&"road.bump_peaks".to_string()));
        assert!(keys.contains(&"road.bump_peaks.min_width".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[road.bump_peaks]
min_prominance = 1000.0
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("road.bump_peaks.min_prominence")
        );
    }

    #[test]
    fn test_known_keys_cover_peak_tables() {
        let known = known_config_keys();
        for table in PEAK_TABLES {
            for field in PEAK_FIELDS {
                assert!(known.contains(&format!("{table}.{field}")));
            }
        }
        assert!(known.contains("transmission.store_url"));
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_partial_peak_table_warns_about_dropped_limits() {
        let toml_str = r#"
[road.bump_peaks]
min_width = 12.0
"#;
        let warnings = validate_peak_tables(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "road.bump_peaks");
        assert!(warnings[0].message.contains("min_height"));
        assert!(warnings[0].message.contains("min_distance"));
        assert!(warnings[0].message.contains("min_prominence"));
        assert!(!warnings[0].message.contains("min_width"));
    }

    #[test]
    fn test_complete_or_absent_peak_tables_are_quiet() {
        let toml_str = r#"
[humidex]
dangerous_above = 46.0

[wind.peaks]
min_height = 20.0
min_distance = 5
"#;
        assert!(validate_peak_tables(toml_str).is_empty());
        assert!(validate_peak_tables("").is_empty());
    }

    #[test]
    fn test_physical_range_defaults_clean() {
        let config = crate::config::PipelineConfig::default();
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty(), "Defaults should produce no errors: {errors:?}");
        assert!(warnings.is_empty(), "Defaults should produce no warnings: {warnings:?}");
    }

    #[test]
    fn test_negative_wind_height_is_error() {
        let mut config = crate::config::PipelineConfig::default();
        config.wind.peaks.min_height = Some(-1.0);
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("wind.peaks.min_height")));
    }

    #[test]
    fn test_positive_pothole_height_warns() {
        let mut config = crate::config::PipelineConfig::default();
        config.road.pothole_peaks.min_height = Some(15_000.0);
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.field == "road.pothole_peaks.min_height"));
    }
}
