//! Physics Engine Module
//!
//! Deterministic environmental formulas. Everything here is a pure function
//! of its inputs.
//!
//! - `calculate_humidex()` / `classify_humidex()` - heat discomfort
//! - `calculate_wind_chill()` / `classify_wind_chill()` - cold wind hazard

pub mod comfort_models;

pub use comfort_models::{
    calculate_humidex, calculate_wind_chill, classify_humidex, classify_wind_chill,
    HUMIDEX_SINGULARITY_C,
};

use thiserror::Error;

/// Input outside the domain on which a formula has a real, finite value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaDomainError {
    #[error("Humidex undefined for temperature {0} °C (must be > -237.7 °C)")]
    HumidexTemperature(f64),

    #[error("Wind chill undefined for wind speed {0} m/s (must be > 0)")]
    WindChillSpeed(f64),
}
