//! Ride-condition classifier
//!
//! Two policies over the same formulas. They can label the same record
//! differently:
//!
//! - **Streaming** (`classify_one`): one record, no neighbours. Road state by
//!   bare z thresholds, humidex per record, wind hazard never evaluated
//!   (`WindChillState::Some`).
//! - **Batch** (`classify_batch`): a full window. Road state and wind events
//!   by peak shape over the window, humidex per record.
//!
//! Both are pure: the same input always yields the same output, and
//! independent windows can be classified on any thread.

mod batch;
mod streaming;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use thiserror::Error;

use crate::config::{HumidexThresholds, PipelineConfig, RoadThresholds, WindThresholds};
use crate::physics_engine::{calculate_humidex, classify_humidex, FormulaDomainError};
use crate::types::{AgentRecord, HumidexState, ProcessedRecord, ValidationError};

// ============================================================================
// Errors
// ============================================================================

/// Why a record or window could not be classified.
///
/// `index` is the record's position in the window (always 0 for the
/// streaming policy).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassificationError {
    #[error("Invalid record at index {index}: {source}")]
    InvalidInput {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("Timestamps out of order at index {index}: {current} precedes {previous}")]
    OutOfOrder {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("Formula failed for record at index {index}: {source}")]
    Formula {
        index: usize,
        #[source]
        source: FormulaDomainError,
    },
}

// ============================================================================
// Classifier
// ============================================================================

/// Classification thresholds bundled with both policies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classifier {
    road: RoadThresholds,
    humidex: HumidexThresholds,
    wind: WindThresholds,
}

impl Classifier {
    pub fn new(road: RoadThresholds, humidex: HumidexThresholds, wind: WindThresholds) -> Self {
        Self { road, humidex, wind }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.road.clone(),
            config.humidex.clone(),
            config.wind.clone(),
        )
    }

    /// Classify independent windows in parallel, each exactly as
    /// [`Classifier::classify_batch`]. Results keep the input order.
    pub fn classify_windows(
        &self,
        windows: Vec<Vec<AgentRecord>>,
    ) -> Vec<Result<Vec<ProcessedRecord>, ClassificationError>> {
        windows
            .into_par_iter()
            .map(|window| self.classify_batch(window))
            .collect()
    }

    fn humidex_state(&self, index: usize, record: &AgentRecord) -> Result<HumidexState, ClassificationError> {
        let humidex = calculate_humidex(record.humidex.temperature, record.humidex.humidity)
            .map_err(|source| ClassificationError::Formula { index, source })?;
        Ok(classify_humidex(humidex, &self.humidex))
    }
}

/// Streaming policy with the built-in thresholds.
pub fn classify_one(record: AgentRecord) -> Result<ProcessedRecord, ClassificationError> {
    Classifier::default().classify_one(record)
}

/// Batch policy with the built-in thresholds.
pub fn classify_batch(records: Vec<AgentRecord>) -> Result<Vec<ProcessedRecord>, ClassificationError> {
    Classifier::default().classify_batch(records)
}


#[cfg(test)]
mod tests {
    use super::test_support::window;
    use super::*;

    #[test]
    fn test_windows_match_individual_batches() {
        let classifier = Classifier::default();
        let mut z = vec![16_000.0; 40];
        z[10..22].fill(18_000.0);
        let first = window(&z, &[5.0; 40], 22.0, 50.0);
        let second = window(&[16_000.0; 5], &[5.0; 5], 35.0, 80.0);

        let expected_first = classifier.classify_batch(first.clone()).unwrap();
        let expected_second = classifier.classify_batch(second.clone()).unwrap();

        let results = classifier.classify_windows(vec![first, second, Vec::new()]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), &expected_first);
        assert_eq!(results[1].as_ref().unwrap(), &expected_second);
        assert!(results[2].as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_windows_report_errors_per_window() {
        let classifier = Classifier::default();
        let good = window(&[16_000.0; 3], &[1.0; 3], 20.0, 50.0);
        let bad = window(&[16_000.0; 3], &[1.0; 3], 20.0, 150.0);

        let results = classifier.classify_windows(vec![good, bad]);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(ClassificationError::InvalidInput { index: 0, .. })
        ));
    }
}
