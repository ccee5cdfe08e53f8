//! Streaming policy: one record at a time, no neighbour context

use crate::types::{AgentRecord, ProcessedRecord, RoadState, WindChillState};

use super::{ClassificationError, Classifier};

impl Classifier {
    /// Classify a single record with fixed thresholds.
    ///
    /// - road: `z <= pothole_max_z` → pothole, `z >= bump_min_z` → bump
    /// - humidex: five-level scale
    /// - wind: always `Some`, since an event needs neighbouring samples
    pub fn classify_one(&self, record: AgentRecord) -> Result<ProcessedRecord, ClassificationError> {
        record
            .validate()
            .map_err(|source| ClassificationError::InvalidInput { index: 0, source })?;

        let road_state = self.road_state_by_threshold(record.accelerometer.z);
        let humidex_state = self.humidex_state(0, &record)?;

        Ok(ProcessedRecord {
            road_state,
            humidex_state,
            wind_chill_state: WindChillState::Some,
            agent_record: record,
        })
    }

    fn road_state_by_threshold(&self, z: f64) -> RoadState {
        if z <= self.road.pothole_max_z {
            RoadState::Pothole
        } else if z >= self.road.bump_min_z {
            RoadState::Bump
        } else {
            RoadState::Normal
        }
    }
}
