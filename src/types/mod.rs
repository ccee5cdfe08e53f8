//! Shared data structures for the ride-condition pipeline
//!
//! - Readings: one value type per sensor, aggregated into `AgentRecord`
//! - Labels: road, humidex and wind-hazard states, and `ProcessedRecord`

mod labels;
mod readings;

pub use labels::*;
pub use readings::*;
