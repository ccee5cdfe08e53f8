//! Environmental comfort models
//!
//! Closed-form perceived-temperature indices:
//! - Humidex (temperature + humidity, heat discomfort)
//! - Wind chill (temperature + wind speed, cold hazard)

use crate::config::HumidexThresholds;
use crate::types::{HumidexState, WindChillState};

use super::FormulaDomainError;

/// Temperature (°C) at which the Magnus-form vapor pressure term divides by zero.
pub const HUMIDEX_SINGULARITY_C: f64 = -237.7;

/// m/s → km/h
const MS_TO_KMH: f64 = 3.6;

// ============================================================================
// Humidex
// ============================================================================

/// Calculate the humidex index
///
/// Formula:
/// - e = 6.112 × 10^(7.5·T / (237.7 + T)) × H / 100   (vapor pressure, hPa)
/// - humidex = T + 5/9 × (e − 10)
///
/// Where:
/// - T = air temperature (°C)
/// - H = relative humidity (%)
pub fn calculate_humidex(temperature: f64, humidity: f64) -> Result<f64, FormulaDomainError> {
    if !temperature.is_finite() || temperature <= HUMIDEX_SINGULARITY_C {
        return Err(FormulaDomainError::HumidexTemperature(temperature));
    }

    let exponent = 7.5 * temperature / (237.7 + temperature);
    let vapor_pressure = 6.112 * 10f64.powf(exponent) * humidity / 100.0;

    Ok(temperature + 5.0 / 9.0 * (vapor_pressure - 10.0))
}

/// Map a humidex value onto the five-level discomfort scale.
///
/// Thresholds are exclusive lower bounds checked from the top down; the
/// first match wins and anything at or below `comfortable_above` is
/// `Undefined`.
pub fn classify_humidex(humidex: f64, thresholds: &HumidexThresholds) -> HumidexState {
    if humidex > thresholds.dangerous_above {
        HumidexState::Dangerous
    } else if humidex > thresholds.great_discomfort_above {
        HumidexState::GreatDiscomfort
    } else if humidex > thresholds.some_discomfort_above {
        HumidexState::SomeDiscomfort
    } else if humidex > thresholds.comfortable_above {
        HumidexState::Comfortable
    } else {
        HumidexState::Undefined
    }
}

// ============================================================================
// Wind Chill
// ============================================================================

/// Calculate the wind-chill index
///
/// Formula: WC = 13.12 + 0.6215·T − 11.37·V^0.16 + 0.3965·T·V^0.16
///
/// Where:
/// - T = air temperature (°C)
/// - V = wind speed (km/h), converted here from the m/s input
///
/// V^0.16 has no real value for V ≤ 0, so non-positive speeds are rejected.
pub fn calculate_wind_chill(temperature: f64, speed_m_s: f64) -> Result<f64, FormulaDomainError> {
    if !speed_m_s.is_finite() || speed_m_s <= 0.0 {
        return Err(FormulaDomainError::WindChillSpeed(speed_m_s));
    }

    let v_pow = (speed_m_s * MS_TO_KMH).powf(0.16);

    Ok(13.12 + 0.6215 * temperature - 11.37 * v_pow + 0.3965 * temperature * v_pow)
}

/// Label a detected wind event by its wind-chill index.
pub fn classify_wind_chill(wind_chill: f64, chill_below: f64) -> WindChillState {
    if wind_chill < chill_below {
        WindChillState::StrongChillWind
    } else {
        WindChillState::StrongWind
    }
}
