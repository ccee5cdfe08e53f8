//! Pipeline Configuration - classifier thresholds and collaborator settings
//!
//! Every classification constant is a field here. Each struct implements
//! `Default` with the built-in values from `defaults`, so a missing file or
//! a missing section behaves exactly like the hardcoded pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;
use crate::processing::PeakParams;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `PipelineConfig::load()` which searches:
/// 1. `$ROAD_VISION_CONFIG` env var
/// 2. `./road_vision.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Road-surface rules (streaming thresholds and batch peak shapes)
    #[serde(default)]
    pub road: RoadThresholds,

    /// Humidex discomfort scale
    #[serde(default)]
    pub humidex: HumidexThresholds,

    /// Wind-event detection and chill split
    #[serde(default)]
    pub wind: WindThresholds,

    /// Sensor file ingestion
    #[serde(default)]
    pub ingestion: IngestionConfig,

    /// Store client
    #[serde(default)]
    pub transmission: TransmissionConfig,
}

impl PipelineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$ROAD_VISION_CONFIG` environment variable
    /// 2. `./road_vision.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", defaults::CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", defaults::CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(defaults::CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(path = %local.display(), "Loaded config from working directory");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::CONFIG_FILE_NAME);
                }
            }
        }

        info!("No {} found, using built-in defaults", defaults::CONFIG_FILE_NAME);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Two-pass: unknown keys only warn, serde does the real parse
        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }
        for w in super::validation::validate_peak_tables(&contents) {
            warn!(table = %w.field, "{}", w);
        }

        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all thresholds for internal consistency.
    ///
    /// Rules:
    /// - Humidex thresholds strictly ascend
    /// - Streaming pothole bound sits below the bump bound
    /// - Peak parameters are usable
    /// - Batch size and timeout are non-zero
    /// - No NaN/Inf anywhere
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let h = &self.humidex;
        Self::check_ascending(
            &[
                ("humidex.comfortable_above", h.comfortable_above),
                ("humidex.some_discomfort_above", h.some_discomfort_above),
                ("humidex.great_discomfort_above", h.great_discomfort_above),
                ("humidex.dangerous_above", h.dangerous_above),
            ],
            &mut errors,
        );

        Self::check_ascending(
            &[
                ("road.pothole_max_z", self.road.pothole_max_z),
                ("road.bump_min_z", self.road.bump_min_z),
            ],
            &mut errors,
        );

        for (name, params) in [
            ("road.bump_peaks", &self.road.bump_peaks),
            ("road.pothole_peaks", &self.road.pothole_peaks),
            ("wind.peaks", &self.wind.peaks),
        ] {
            if let Err(e) = params.validate() {
                errors.push(format!("{name}: {e}"));
            }
        }

        if !self.wind.chill_below.is_finite() {
            errors.push(format!(
                "wind.chill_below must be finite (got {})",
                self.wind.chill_below
            ));
        }

        if self.ingestion.batch_size == 0 {
            errors.push("ingestion.batch_size must be > 0".to_string());
        }
        if self.transmission.timeout_secs == 0 {
            errors.push("transmission.timeout_secs must be > 0".to_string());
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_ascending(values: &[(&str, f64)], errors: &mut Vec<String>) {
        // NaN comparisons silently pass, catch them first
        if let Some((name, v)) = values.iter().find(|(_, v)| !v.is_finite()) {
            errors.push(format!("{name}: value must be finite (got {v})"));
            return;
        }
        for pair in values.windows(2) {
            let (lo_name, lo) = pair[0];
            let (hi_name, hi) = pair[1];
            if hi <= lo {
                errors.push(format!(
                    "{hi_name} ({hi:.3}) must be greater than {lo_name} ({lo:.3})"
                ));
            }
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Road Thresholds
// ============================================================================

/// Vertical-acceleration rules for road-surface classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadThresholds {
    /// Streaming: z <= this is a pothole
    #[serde(default = "default_pothole_max_z")]
    pub pothole_max_z: f64,

    /// Streaming: z >= this is a bump
    #[serde(default = "default_bump_min_z")]
    pub bump_min_z: f64,

    /// Batch: peak shape of a bump on the z series
    #[serde(default = "default_bump_peaks")]
    pub bump_peaks: PeakParams,

    /// Batch: peak shape of a pothole on the negated z series
    #[serde(default = "default_pothole_peaks")]
    pub pothole_peaks: PeakParams,
}

fn default_pothole_max_z() -> f64 {
    defaults::POTHOLE_MAX_Z
}
fn default_bump_min_z() -> f64 {
    defaults::BUMP_MIN_Z
}
fn default_bump_peaks() -> PeakParams {
    defaults::BUMP_PEAKS
}
fn default_pothole_peaks() -> PeakParams {
    defaults::POTHOLE_PEAKS
}

impl Default for RoadThresholds {
    fn default() -> Self {
        Self {
            pothole_max_z: default_pothole_max_z(),
            bump_min_z: default_bump_min_z(),
            bump_peaks: default_bump_peaks(),
            pothole_peaks: default_pothole_peaks(),
        }
    }
}

// ============================================================================
// Humidex Thresholds
// ============================================================================

/// Exclusive lower bounds of the humidex discomfort levels (°C).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumidexThresholds {
    #[serde(default = "default_comfortable_above")]
    pub comfortable_above: f64,

    #[serde(default = "default_some_discomfort_above")]
    pub some_discomfort_above: f64,

    #[serde(default = "default_great_discomfort_above")]
    pub great_discomfort_above: f64,

    #[serde(default = "default_dangerous_above")]
    pub dangerous_above: f64,
}

fn default_comfortable_above() -> f64 {
    defaults::HUMIDEX_COMFORTABLE_ABOVE
}
fn default_some_discomfort_above() -> f64 {
    defaults::HUMIDEX_SOME_DISCOMFORT_ABOVE
}
fn default_great_discomfort_above() -> f64 {
    defaults::HUMIDEX_GREAT_DISCOMFORT_ABOVE
}
fn default_dangerous_above() -> f64 {
    defaults::HUMIDEX_DANGEROUS_ABOVE
}

impl Default for HumidexThresholds {
    fn default() -> Self {
        Self {
            comfortable_above: default_comfortable_above(),
            some_discomfort_above: default_some_discomfort_above(),
            great_discomfort_above: default_great_discomfort_above(),
            dangerous_above: default_dangerous_above(),
        }
    }
}

// ============================================================================
// Wind Thresholds
// ============================================================================

/// Wind-event detection on the speed series and the chill split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindThresholds {
    /// Wind-chill index (°C) below which an event is a chill wind
    #[serde(default = "default_chill_below")]
    pub chill_below: f64,

    /// Peak shape of a wind event on the speed series (m/s)
    #[serde(default = "default_wind_peaks")]
    pub peaks: PeakParams,
}

fn default_chill_below() -> f64 {
    defaults::WIND_CHILL_BELOW
}
fn default_wind_peaks() -> PeakParams {
    defaults::WIND_PEAKS
}

impl Default for WindThresholds {
    fn default() -> Self {
        Self {
            chill_below: default_chill_below(),
            peaks: default_wind_peaks(),
        }
    }
}

// ============================================================================
// Ingestion
// ============================================================================

/// Sensor CSV files and batching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// User id stamped on every record
    #[serde(default = "default_user_id")]
    pub user_id: i64,

    /// Records per classification window
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerometer_csv: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_csv: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidex_csv: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anemometer_csv: Option<PathBuf>,
}

fn default_user_id() -> i64 {
    defaults::DEFAULT_USER_ID
}
fn default_batch_size() -> usize {
    defaults::DEFAULT_BATCH_SIZE
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            batch_size: default_batch_size(),
            accelerometer_csv: None,
            gps_csv: None,
            humidex_csv: None,
            anemometer_csv: None,
        }
    }
}

// ============================================================================
// Transmission
// ============================================================================

/// Where labeled records are sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionConfig {
    /// Base URL of the store service; records are printed when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_url: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    defaults::TRANSMISSION_TIMEOUT_SECS
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            store_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}
