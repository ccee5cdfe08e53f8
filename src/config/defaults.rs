//! System-wide default constants.
//!
//! Every threshold the classifier uses when no config file overrides it.
//! Grouped by subsystem for easy discovery.

use crate::processing::PeakParams;

// ============================================================================
// Config Discovery
// ============================================================================

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "ROAD_VISION_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "road_vision.toml";

// ============================================================================
// Road Surface
// ============================================================================

/// Streaming policy: z at or below this is a pothole.
pub const POTHOLE_MAX_Z: f64 = 15_000.0;

/// Streaming policy: z at or above this is a bump.
pub const BUMP_MIN_Z: f64 = 17_000.0;

/// Batch policy: bump peaks on the raw z series.
pub const BUMP_PEAKS: PeakParams = PeakParams {
    min_height: Some(17_000.0),
    min_distance: Some(10),
    min_prominence: Some(1_000.0),
    min_width: Some(10.0),
};

/// Batch policy: pothole peaks on the negated z series.
///
/// `min_height` is on the negated scale: -15 000 keeps z <= 15 000.
pub const POTHOLE_PEAKS: PeakParams = PeakParams {
    min_height: Some(-15_000.0),
    min_distance: Some(15),
    min_prominence: Some(1_000.0),
    min_width: Some(15.0),
};

// ============================================================================
// Humidex
// ============================================================================

pub const HUMIDEX_COMFORTABLE_ABOVE: f64 = 20.0;
pub const HUMIDEX_SOME_DISCOMFORT_ABOVE: f64 = 30.0;
pub const HUMIDEX_GREAT_DISCOMFORT_ABOVE: f64 = 40.0;
pub const HUMIDEX_DANGEROUS_ABOVE: f64 = 45.0;

// ============================================================================
// Wind
// ============================================================================

/// Wind-chill index (°C) below which a wind event is a chill wind.
pub const WIND_CHILL_BELOW: f64 = -10.0;

/// Batch policy: wind events on the speed series (m/s).
pub const WIND_PEAKS: PeakParams = PeakParams {
    min_height: Some(25.0),
    min_distance: Some(10),
    min_prominence: None,
    min_width: None,
};

// ============================================================================
// Ingestion / Transmission
// ============================================================================

/// User id stamped on every record read from files.
pub const DEFAULT_USER_ID: i64 = 1;

/// Records per classification window.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// HTTP timeout for the store client (seconds).
pub const TRANSMISSION_TIMEOUT_SECS: u64 = 30;
