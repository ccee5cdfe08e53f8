//! Batch policy: peak-shape classification over a full window
//!
//! Each label series is computed independently as a pure function of the
//! window, then zipped with the records. Road-state precedence is explicit:
//! a sample accepted by both the bump and the pothole pass is a pothole.

use tracing::{debug, warn};

use crate::physics_engine::{calculate_wind_chill, classify_wind_chill};
use crate::processing::find_peaks;
use crate::types::{AgentRecord, HumidexState, ProcessedRecord, RoadState, WindChillState};

use super::{ClassificationError, Classifier};

impl Classifier {
    /// Classify a window of records in timestamp order.
    ///
    /// Output has the same length and order as the input. Windows shorter
    /// than three samples can hold no peaks, so their road and wind labels
    /// stay at the `Normal` default.
    pub fn classify_batch(
        &self,
        records: Vec<AgentRecord>,
    ) -> Result<Vec<ProcessedRecord>, ClassificationError> {
        check_window(&records)?;

        let road_states = self.road_states_by_peaks(&records);
        let humidex_states = records
            .iter()
            .enumerate()
            .map(|(i, record)| self.humidex_state(i, record))
            .collect::<Result<Vec<HumidexState>, _>>()?;
        let wind_states = self.wind_states_by_peaks(&records);

        debug!(
            records = records.len(),
            bumps = road_states.iter().filter(|s| **s == RoadState::Bump).count(),
            potholes = road_states.iter().filter(|s| **s == RoadState::Pothole).count(),
            wind_events = wind_states.iter().filter(|s| s.is_wind_event()).count(),
            "Classified batch"
        );

        Ok(records
            .into_iter()
            .zip(road_states)
            .zip(humidex_states)
            .zip(wind_states)
            .map(|(((agent_record, road_state), humidex_state), wind_chill_state)| {
                ProcessedRecord {
                    road_state,
                    humidex_state,
                    wind_chill_state,
                    agent_record,
                }
            })
            .collect())
    }

    /// Bumps are peaks of z; potholes are peaks of -z. The pothole pass wins
    /// on overlap.
    fn road_states_by_peaks(&self, records: &[AgentRecord]) -> Vec<RoadState> {
        let z: Vec<f64> = records.iter().map(|r| r.accelerometer.z).collect();
        let negated: Vec<f64> = z.iter().map(|v| -v).collect();

        let bumps = find_peaks(&z, &self.road.bump_peaks);
        let potholes = find_peaks(&negated, &self.road.pothole_peaks);

        merge_road_passes(records.len(), &bumps, &potholes)
    }

    /// Wind events are peaks of the speed series, labeled by the wind-chill
    /// index of that sample.
    fn wind_states_by_peaks(&self, records: &[AgentRecord]) -> Vec<WindChillState> {
        let speeds: Vec<f64> = records.iter().map(|r| r.anemometer.speed).collect();
        let events = find_peaks(&speeds, &self.wind.peaks);

        records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                if events.binary_search(&i).is_err() {
                    return WindChillState::Normal;
                }
                match calculate_wind_chill(record.humidex.temperature, record.anemometer.speed) {
                    Ok(wind_chill) => classify_wind_chill(wind_chill, self.wind.chill_below),
                    Err(e) => {
                        warn!(index = i, error = %e, "Wind event outside wind-chill domain, keeping default label");
                        WindChillState::Normal
                    }
                }
            })
            .collect()
    }
}

/// Road label per sample from the sorted peak indices of both passes.
fn merge_road_passes(len: usize, bumps: &[usize], potholes: &[usize]) -> Vec<RoadState> {
    (0..len)
        .map(|i| {
            if potholes.binary_search(&i).is_ok() {
                RoadState::Pothole
            } else if bumps.binary_search(&i).is_ok() {
                RoadState::Bump
            } else {
                RoadState::Normal
            }
        })
        .collect()
}

/// Every record valid, timestamps non-decreasing.
fn check_window(records: &[AgentRecord]) -> Result<(), ClassificationError> {
    for (index, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|source| ClassificationError::InvalidInput { index, source })?;
    }

    if let Some(index) = records
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp)
    {
        return Err(ClassificationError::OutOfOrder {
            index: index + 1,
            previous: records[index].timestamp,
            current: records[index + 1].timestamp,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::window;
    use super::*;
    use crate::config::{HumidexThresholds, RoadThresholds, WindThresholds};
    use crate::processing::PeakParams;

    fn labels(processed: &[ProcessedRecord]) -> Vec<RoadState> {
        processed.iter().map(|p| p.road_state).collect()
    }

    #[test]
    fn test_empty_and_single_windows() {
        let classifier = Classifier::default();
        assert!(classifier.classify_batch(Vec::new()).unwrap().is_empty());

        let out = classifier
            .classify_batch(window(&[18_000.0], &[40.0], 20.0, 40.0))
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].road_state, RoadState::Normal);
        assert_eq!(out[0].wind_chill_state, WindChillState::Normal);
        assert_eq!(out[0].humidex_state, HumidexState::Undefined);
    }

    #[test]
    fn test_wide_bump_marks_single_index() {
        let mut z = vec![16_000.0; 40];
        z[10..22].fill(18_000.0);
        let out = Classifier::default()
            .classify_batch(window(&z, &[5.0; 40], 22.0, 50.0))
            .unwrap();

        let mut expected = vec![RoadState::Normal; 40];
        expected[10] = RoadState::Bump;
        assert_eq!(labels(&out), expected);
    }

    #[test]
    fn test_narrow_spike_rejected_by_width() {
        let mut z = vec![16_000.0; 30];
        z[12] = 18_000.0;
        let out = Classifier::default()
            .classify_batch(window(&z, &[5.0; 30], 22.0, 50.0))
            .unwrap();
        assert!(out.iter().all(|p| p.road_state == RoadState::Normal));
    }

    #[test]
    fn test_sustained_dip_is_pothole() {
        let mut z = vec![16_000.0; 50];
        z[15..32].fill(14_000.0);
        let out = Classifier::default()
            .classify_batch(window(&z, &[5.0; 50], 22.0, 50.0))
            .unwrap();

        let mut expected = vec![RoadState::Normal; 50];
        expected[15] = RoadState::Pothole;
        assert_eq!(labels(&out), expected);
    }

    #[test]
    fn test_unconstrained_passes_label_both_directions() {
        let everything = PeakParams::default();
        let road = RoadThresholds {
            bump_peaks: everything,
            pothole_peaks: everything,
            ..RoadThresholds::default()
        };
        let classifier = Classifier::new(road, HumidexThresholds::default(), WindThresholds::default());

        // Index 2 is a maximum of z; index 4 a maximum of -z.
        let z = [0.0, 1.0, 5.0, 1.0, -5.0, 1.0, 0.0];
        let out = classifier
            .classify_batch(window(&z, &[1.0; 7], 20.0, 50.0))
            .unwrap();
        assert_eq!(out[2].road_state, RoadState::Bump);
        assert_eq!(out[4].road_state, RoadState::Pothole);
    }

    #[test]
    fn test_overlapping_passes_resolve_to_pothole() {
        let merged = merge_road_passes(6, &[1, 3], &[3, 4]);
        assert_eq!(
            merged,
            vec![
                RoadState::Normal,
                RoadState::Bump,
                RoadState::Normal,
                RoadState::Pothole,
                RoadState::Pothole,
                RoadState::Normal,
            ]
        );
    }

    #[test]
    fn test_wind_gust_labeled_by_wind_chill() {
        let mut speed = vec![4.0; 30];
        speed[10] = 30.0;
        let mild = Classifier::default()
            .classify_batch(window(&[16_000.0; 30], &speed, 20.0, 50.0))
            .unwrap();
        assert_eq!(mild[10].wind_chill_state, WindChillState::StrongWind);
        assert!(mild
            .iter()
            .enumerate()
            .all(|(i, p)| i == 10 || p.wind_chill_state == WindChillState::Normal));

        let freezing = Classifier::default()
            .classify_batch(window(&[16_000.0; 30], &speed, -20.0, 50.0))
            .unwrap();
        assert_eq!(freezing[10].wind_chill_state, WindChillState::StrongChillWind);
    }

    #[test]
    fn test_close_gusts_keep_stronger() {
        let mut speed = vec![4.0; 30];
        speed[10] = 27.0;
        speed[15] = 32.0;
        speed[26] = 26.0;
        let out = Classifier::default()
            .classify_batch(window(&[16_000.0; 30], &speed, 15.0, 50.0))
            .unwrap();
        let events: Vec<usize> = out
            .iter()
            .enumerate()
            .filter(|(_, p)| p.wind_chill_state.is_wind_event())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(events, vec![15, 26]);
    }

    #[test]
    fn test_out_of_domain_wind_peak_keeps_default() {
        let wind = WindThresholds {
            peaks: PeakParams::default(),
            ..WindThresholds::default()
        };
        let classifier = Classifier::new(RoadThresholds::default(), HumidexThresholds::default(), wind);
        // A local maximum at 0 m/s: wind chill is undefined there.
        let records = window(&[16_000.0; 3], &[-1.0, 0.0, -1.0], 5.0, 50.0);
        let out = classifier.classify_batch(records).unwrap();
        assert!(out.iter().all(|p| p.wind_chill_state == WindChillState::Normal));
    }

    #[test]
    fn test_out_of_order_timestamps_rejected() {
        let mut records = window(&[16_000.0; 4], &[1.0; 4], 20.0, 50.0);
        records.swap(1, 2);
        assert!(matches!(
            Classifier::default().classify_batch(records),
            Err(ClassificationError::OutOfOrder { index: 2, .. })
        ));
    }

    #[test]
    fn test_invalid_record_index_reported() {
        let mut records = window(&[16_000.0; 4], &[1.0; 4], 20.0, 50.0);
        records[3].humidex.humidity = -5.0;
        assert!(matches!(
            Classifier::default().classify_batch(records),
            Err(ClassificationError::InvalidInput { index: 3, .. })
        ));
    }
}
