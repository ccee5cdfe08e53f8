//! Peak detection over bounded numeric windows
//!
//! Finds local maxima and filters them by height, spacing, prominence and
//! width. Only maxima are ever reported: to find minima, negate the signal
//! (and the height bound) before calling.
//!
//! Filters run in a fixed order, each on the survivors of the previous one:
//!
//! 1. local maxima (plateaus report their first sample)
//! 2. `min_height`
//! 3. `min_distance` (higher peaks win, ties go to the earlier index)
//! 4. `min_prominence`
//! 5. `min_width` (measured at half prominence)
//!
//! Prominence and width are always measured against the full signal, not
//! against the surviving peaks.

use serde::{Deserialize, Serialize};

use super::ProcessingError;

// ============================================================================
// Parameters
// ============================================================================

/// Peak acceptance constraints. `None` disables a constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakParams {
    /// Minimum sample value at the peak
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f64>,

    /// Minimum spacing between accepted peaks (samples)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_distance: Option<usize>,

    /// Minimum vertical drop to the higher of the two bases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_prominence: Option<f64>,

    /// Minimum width at half prominence (samples, interpolated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
}

impl PeakParams {
    /// Check that every present constraint is usable.
    pub fn validate(&self) -> Result<(), ProcessingError> {
        if let Some(h) = self.min_height {
            if !h.is_finite() {
                return Err(ProcessingError::InvalidParameter {
                    name: "min_height",
                    reason: format!("must be finite, got {h}"),
                });
            }
        }
        if self.min_distance == Some(0) {
            return Err(ProcessingError::InvalidParameter {
                name: "min_distance",
                reason: "must be >= 1 sample".to_string(),
            });
        }
        if let Some(p) = self.min_prominence {
            if !p.is_finite() || p < 0.0 {
                return Err(ProcessingError::InvalidParameter {
                    name: "min_prominence",
                    reason: format!("must be finite and >= 0, got {p}"),
                });
            }
        }
        if let Some(w) = self.min_width {
            if !w.is_finite() || w < 0.0 {
                return Err(ProcessingError::InvalidParameter {
                    name: "min_width",
                    reason: format!("must be finite and >= 0, got {w}"),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Peak Description
// ============================================================================

/// An accepted peak and the shape measurements that admitted it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub index: usize,
    pub height: f64,
    pub prominence: f64,
    /// Lowest point between the peak and the nearest higher sample on the left
    pub left_base: usize,
    /// Same, on the right
    pub right_base: usize,
    /// Width at half prominence
    pub width: f64,
}

// ============================================================================
// Detection
// ============================================================================

/// Indices of peaks in `signal` satisfying `params`, in ascending order.
pub fn find_peaks(signal: &[f64], params: &PeakParams) -> Vec<usize> {
    find_peaks_detailed(signal, params)
        .into_iter()
        .map(|p| p.index)
        .collect()
}

/// Like [`find_peaks`], but returns the measured shape of each peak.
pub fn find_peaks_detailed(signal: &[f64], params: &PeakParams) -> Vec<Peak> {
    let mut candidates = local_maxima(signal);

    if let Some(min_height) = params.min_height {
        candidates.retain(|&i| signal[i] >= min_height);
    }

    if let Some(distance) = params.min_distance {
        candidates = select_by_distance(signal, &candidates, distance);
    }

    candidates
        .into_iter()
        .filter_map(|index| {
            let (prominence, left_base, right_base) = peak_prominence(signal, index);
            if params.min_prominence.is_some_and(|min| prominence < min) {
                return None;
            }
            let width = peak_width(signal, index, prominence, left_base, right_base);
            if params.min_width.is_some_and(|min| width < min) {
                return None;
            }
            Some(Peak {
                index,
                height: signal[index],
                prominence,
                left_base,
                right_base,
                width,
            })
        })
        .collect()
}

/// Samples strictly higher than both neighbours. A flat top counts once, at
/// its first sample, when the samples on either side of it are both lower.
/// The first and last samples are never peaks.
fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }

    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                peaks.push(i);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Drop peaks closer than `distance` samples to a higher (or equally high
/// and earlier) accepted peak.
fn select_by_distance(x: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    let n = peaks.len();
    let mut keep = vec![true; n];

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| x[peaks[b]].total_cmp(&x[peaks[a]]).then(a.cmp(&b)));

    for &j in &order {
        if !keep[j] {
            continue;
        }

        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            k -= 1;
            keep[k] = false;
        }

        let mut k = j + 1;
        while k < n && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, kept)| kept.then_some(p))
        .collect()
}

/// Returns (prominence, left_base, right_base).
fn peak_prominence(x: &[f64], peak: usize) -> (f64, usize, usize) {
    let height = x[peak];

    let mut left_min = height;
    let mut left_base = peak;
    let mut i = peak;
    loop {
        if x[i] > height {
            break;
        }
        if x[i] < left_min {
            left_min = x[i];
            left_base = i;
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }

    let mut right_min = height;
    let mut right_base = peak;
    for (j, &v) in x.iter().enumerate().skip(peak) {
        if v > height {
            break;
        }
        if v < right_min {
            right_min = v;
            right_base = j;
        }
    }

    (height - left_min.max(right_min), left_base, right_base)
}

/// Horizontal span at `x[peak] - prominence / 2`, with linear interpolation
/// at both crossings.
fn peak_width(x: &[f64], peak: usize, prominence: f64, left_base: usize, right_base: usize) -> f64 {
    let level = x[peak] - prominence * 0.5;

    let mut i = peak;
    while left_base < i && level < x[i] {
        i -= 1;
    }
    let mut left = i as f64;
    if x[i] < level {
        left += (level - x[i]) / (x[i + 1] - x[i]);
    }

    let mut i = peak;
    while i < right_base && level < x[i] {
        i += 1;
    }
    let mut right = i as f64;
    if x[i] < level {
        right -= (level - x[i]) / (x[i - 1] - x[i]);
    }

    right - left
}
