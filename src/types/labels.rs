//! Condition labels and the labeled output record

use serde::{Deserialize, Serialize};

use super::AgentRecord;

// ============================================================================
// Road Surface
// ============================================================================

/// Road-surface state derived from the vertical accelerometer axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoadState {
    #[default]
    Normal,
    Bump,
    Pothole,
}

impl std::fmt::Display for RoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoadState::Normal => write!(f, "normal"),
            RoadState::Bump => write!(f, "bump"),
            RoadState::Pothole => write!(f, "pothole"),
        }
    }
}

// ============================================================================
// Thermal Discomfort
// ============================================================================

/// Five-level humidex scale, plus the batch policy's `Normal` seed value.
///
/// `Normal` is never the result of a humidex evaluation: the evaluation
/// always lands on one of the other five variants, `Undefined` being the
/// floor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum HumidexState {
    #[default]
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "undefined")]
    Undefined,
    #[serde(rename = "comfortable")]
    Comfortable,
    #[serde(rename = "some discomfort")]
    SomeDiscomfort,
    #[serde(rename = "great discomfort")]
    GreatDiscomfort,
    #[serde(rename = "dangerous")]
    Dangerous,
}

impl std::fmt::Display for HumidexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HumidexState::Normal => write!(f, "normal"),
            HumidexState::Undefined => write!(f, "undefined"),
            HumidexState::Comfortable => write!(f, "comfortable"),
            HumidexState::SomeDiscomfort => write!(f, "some discomfort"),
            HumidexState::GreatDiscomfort => write!(f, "great discomfort"),
            HumidexState::Dangerous => write!(f, "dangerous"),
        }
    }
}

// ============================================================================
// Wind Hazard
// ============================================================================

/// Wind-hazard state.
///
/// - `Normal`: batch default, no wind event detected (calm)
/// - `Some`: placeholder emitted by the streaming policy, which never
///   evaluates wind chill
/// - `StrongWind` / `StrongChillWind`: wind event detected, split on the
///   wind-chill index
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum WindChillState {
    #[default]
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "some")]
    Some,
    #[serde(rename = "strong wind")]
    StrongWind,
    #[serde(rename = "strong chill wind")]
    StrongChillWind,
}

impl WindChillState {
    /// True when a wind event was detected for this record.
    pub fn is_wind_event(&self) -> bool {
        matches!(self, WindChillState::StrongWind | WindChillState::StrongChillWind)
    }
}

impl std::fmt::Display for WindChillState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindChillState::Normal => write!(f, "normal"),
            WindChillState::Some => write!(f, "some"),
            WindChillState::StrongWind => write!(f, "strong wind"),
            WindChillState::StrongChillWind => write!(f, "strong chill wind"),
        }
    }
}

// ============================================================================
// Processed Record
// ============================================================================

/// Classifier output: three independent labels paired with the input record.
///
/// Built once by value and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub road_state: RoadState,
    pub humidex_state: HumidexState,
    pub wind_chill_state: WindChillState,
    #[serde(rename = "agent_data")]
    pub agent_record: AgentRecord,
}
