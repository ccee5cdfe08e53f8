//! Road Vision: ride-condition classification
//!
//! Turns timestamped multi-sensor records from a moving vehicle into
//! road-surface, heat-comfort and wind-hazard labels.
//!
//! ## Architecture
//!
//! - **Types**: sensor readings, aggregated records, label enums
//! - **Physics Engine**: humidex and wind-chill formulas
//! - **Processing**: 1-D peak detector
//! - **Classifier**: streaming (per record) and batch (per window) policies
//! - **Sensors / Transmission**: CSV replay in, JSON out

pub mod classifier;
pub mod config;
pub mod physics_engine;
pub mod processing;
pub mod sensors;
pub mod transmission;
pub mod types;

// Re-export commonly used types
pub use types::{
    AccelerometerReading, AgentRecord, AnemometerReading, GpsReading, HumidexReading,
    HumidexState, ProcessedRecord, RoadState, ValidationError, WindChillState,
};

pub use classifier::{classify_batch, classify_one, ClassificationError, Classifier};
pub use config::{ConfigError, PipelineConfig};
pub use processing::{find_peaks, PeakParams};
pub use sensors::{generate_ride_test_data, FileDatasource, IngestionError, SensorFiles};
pub use transmission::{JsonLinesSink, RecordSink, StoreClient, TransmissionError};
