//! Config Validation Tests
//!
//! Load real TOML files from disk and check that typos warn, impossible
//! values fail, and a loaded config drives the classifier.

use std::io::Write;

use road_vision::config::validation::{
    validate_peak_tables, validate_physical_ranges, validate_unknown_keys,
};
use road_vision::config::{ConfigError, PipelineConfig};
use road_vision::Classifier;
use tempfile::NamedTempFile;

fn write_toml(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_humidex_section_warns_with_suggestion() {
    let toml_str = r#"
[humidex]
dangerous_abvoe = 46.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("humidex.dangerous_above")
    );
}

#[test]
fn typo_in_peak_table_warns() {
    let toml_str = r#"
[road.bump_peaks]
min_widht = 8.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("road.bump_peaks.min_width")
    );
}

#[test]
fn typo_does_not_block_loading() {
    let file = write_toml(
        r#"
[wind]
chill_belwo = -5.0
chill_below = -12.0
"#,
    );
    let config = PipelineConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.wind.chill_below, -12.0);
}

#[test]
fn partial_peak_table_warns_and_drops_limits() {
    let toml_str = r#"
[road.bump_peaks]
min_width = 12.0
"#;
    let warnings = validate_peak_tables(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "road.bump_peaks");

    // Still loads; the omitted limits are off.
    let file = write_toml(toml_str);
    let config = PipelineConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.road.bump_peaks.min_width, Some(12.0));
    assert_eq!(config.road.bump_peaks.min_height, None);
    assert_eq!(config.road.bump_peaks.min_distance, None);
}

// ============================================================================
// Range and Ordering Validation
// ============================================================================

#[test]
fn full_config_file_loads() {
    let file = write_toml(
        r#"
[road]
pothole_max_z = 14500.0
bump_min_z = 17500.0

[road.bump_peaks]
min_height = 17500.0
min_distance = 8
min_prominence = 800.0
min_width = 6.0

[humidex]
comfortable_above = 21.0
some_discomfort_above = 29.0
great_discomfort_above = 39.0
dangerous_above = 46.0

[wind.peaks]
min_height = 20.0
min_distance = 5

[ingestion]
user_id = 42
batch_size = 50
accelerometer_csv = "data/accelerometer.csv"

[transmission]
store_url = "http://127.0.0.1:8000"
timeout_secs = 5
"#,
    );
    let config = PipelineConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.road.bump_peaks.min_distance, Some(8));
    assert_eq!(config.road.pothole_peaks, PipelineConfig::default().road.pothole_peaks);
    assert_eq!(config.wind.peaks.min_prominence, None);
    assert_eq!(config.ingestion.user_id, 42);
    assert_eq!(config.ingestion.gps_csv, None);
    assert_eq!(config.transmission.store_url.as_deref(), Some("http://127.0.0.1:8000"));
    assert!(validate_physical_ranges(&config).1.is_empty());
}

#[test]
fn descending_humidex_thresholds_fail_to_load() {
    let file = write_toml(
        r#"
[humidex]
great_discomfort_above = 50.0
"#,
    );
    match PipelineConfig::load_from_file(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("humidex.dangerous_above")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn negative_user_id_fails_to_load() {
    let file = write_toml("[ingestion]\nuser_id = -3\n");
    assert!(matches!(
        PipelineConfig::load_from_file(file.path()),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn malformed_toml_is_parse_error() {
    let file = write_toml("[road\npothole_max_z = 1");
    assert!(matches!(
        PipelineConfig::load_from_file(file.path()),
        Err(ConfigError::Parse(..))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("road_vision.toml");
    assert!(matches!(
        PipelineConfig::load_from_file(&missing),
        Err(ConfigError::Io(..))
    ));
}

// ============================================================================
// Config Drives Classification
// ============================================================================

#[test]
fn loaded_thresholds_change_streaming_labels() {
    let file = write_toml(
        r#"
[road]
pothole_max_z = 15000.0
bump_min_z = 16000.0
"#,
    );
    let config = PipelineConfig::load_from_file(file.path()).unwrap();
    let record = road_vision::generate_ride_test_data(1).remove(0);
    assert!(record.accelerometer.z >= 16_000.0);

    let tuned = Classifier::from_config(&config).classify_one(record.clone()).unwrap();
    let stock = Classifier::default().classify_one(record).unwrap();
    assert_eq!(tuned.road_state, road_vision::RoadState::Bump);
    assert_eq!(stock.road_state, road_vision::RoadState::Normal);
}
