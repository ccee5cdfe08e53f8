//! Signal processing module - peak detection over sensor windows

mod peaks;

pub use peaks::{find_peaks, find_peaks_detailed, Peak, PeakParams};

use thiserror::Error;

/// Errors in signal processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("Invalid peak parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}
