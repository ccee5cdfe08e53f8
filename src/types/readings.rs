//! Sensor reading types
//!
//! One value type per physical sensor, plus the per-tick aggregate
//! [`AgentRecord`] that the classifier consumes. Units are fixed at the
//! ingestion boundary: degrees, °C, % and m/s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Validation Errors
// ============================================================================

/// A reading that violates a range or format invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} = {value} is outside {range}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        range: &'static str,
    },

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("Missing column '{0}'")]
    MissingField(String),

    #[error("Cannot parse {field} as a number: '{raw}'")]
    InvalidNumber { field: String, raw: String },
}

fn ensure_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite { field })
    }
}

// ============================================================================
// Per-Sensor Readings
// ============================================================================

/// Three-axis accelerometer sample. `z` is the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerometerReading {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelerometerReading {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_finite("accelerometer.x", self.x)?;
        ensure_finite("accelerometer.y", self.y)?;
        ensure_finite("accelerometer.z", self.z)
    }
}

/// GPS fix in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsReading {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsReading {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_finite("gps.latitude", self.latitude)?;
        ensure_finite("gps.longitude", self.longitude)
    }
}

/// Air temperature (°C) and relative humidity (%, 0-100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HumidexReading {
    pub temperature: f64,
    pub humidity: f64,
}

impl HumidexReading {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_finite("humidex.temperature", self.temperature)?;
        ensure_finite("humidex.humidity", self.humidity)?;
        if !(0.0..=100.0).contains(&self.humidity) {
            return Err(ValidationError::OutOfRange {
                field: "humidex.humidity",
                value: self.humidity,
                range: "[0, 100] %",
            });
        }
        Ok(())
    }
}

/// Wind speed (m/s) and direction (degrees, 0 = North, clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnemometerReading {
    pub speed: f64,
    pub direction: f64,
}

impl AnemometerReading {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_finite("anemometer.speed", self.speed)?;
        ensure_finite("anemometer.direction", self.direction)?;
        if !(0.0..360.0).contains(&self.direction) {
            return Err(ValidationError::OutOfRange {
                field: "anemometer.direction",
                value: self.direction,
                range: "[0, 360) degrees",
            });
        }
        Ok(())
    }
}

// ============================================================================
// Aggregate Record
// ============================================================================

/// All four sensor readings for one sampling tick, tagged with the
/// reporting user and the tick's timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub user_id: i64,
    pub accelerometer: AccelerometerReading,
    pub gps: GpsReading,
    pub humidex: HumidexReading,
    pub anemometer: AnemometerReading,
    pub timestamp: DateTime<Utc>,
}

impl AgentRecord {
    pub fn new(
        user_id: i64,
        accelerometer: AccelerometerReading,
        gps: GpsReading,
        humidex: HumidexReading,
        anemometer: AnemometerReading,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            accelerometer,
            gps,
            humidex,
            anemometer,
            timestamp,
        }
    }

    /// Check every sub-reading's range and finiteness invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.accelerometer.validate()?;
        self.gps.validate()?;
        self.humidex.validate()?;
        self.anemometer.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(humidity: f64, direction: f64) -> AgentRecord {
        AgentRecord::new(
            1,
            AccelerometerReading { x: 0.0, y: 0.0, z: 16000.0 },
            GpsReading { latitude: 50.45, longitude: 30.52 },
            HumidexReading { temperature: 22.0, humidity },
            AnemometerReading { speed: 3.0, direction },
            Utc::now(),
        )
    }

    #[test]
    fn test_valid_record_passes() {
        assert!(record(55.0, 90.0).validate().is_ok());
        assert!(record(0.0, 0.0).validate().is_ok());
        assert!(record(100.0, 359.9).validate().is_ok());
    }

    #[test]
    fn test_humidity_out_of_range() {
        let err = record(100.5, 90.0).validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { field: "humidex.humidity", .. }
        ));
    }

    #[test]
    fn test_direction_360_rejected() {
        let err = record(50.0, 360.0).validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { field: "anemometer.direction", .. }
        ));
    }

    #[test]
    fn test_nan_rejected() {
        let mut r = record(50.0, 10.0);
        r.accelerometer.z = f64::NAN;
        assert_eq!(
            r.validate(),
            Err(ValidationError::NonFinite { field: "accelerometer.z" })
        );
    }
}
