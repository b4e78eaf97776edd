use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Number of trailing pitch slots in every fingerprint.
pub const PITCH_DIMS: usize = 5;

/// Layout of the feature vector produced by the upstream extractor:
///
/// ```text
/// [mfcc mean | mfcc std | mfcc median]   n_mfcc each
/// [contrast mean | contrast std]         n_bands + 1 each
/// [pitch mean, std, median, max, min]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureLayout {
    pub n_mfcc: usize,
    pub n_bands: usize,
}

impl Default for FeatureLayout {
    fn default() -> Self {
        Self {
            n_mfcc: 13,
            n_bands: 6,
        }
    }
}

impl FeatureLayout {
    /// Total fingerprint dimension.
    pub fn dim(&self) -> usize {
        self.mfcc_range().len() + self.contrast_range().len() + PITCH_DIMS
    }

    pub fn mfcc_range(&self) -> Range<usize> {
        0..self.n_mfcc * 3
    }

    /// Spectral contrast yields one row per band plus the residual row.
    pub fn contrast_range(&self) -> Range<usize> {
        let start = self.mfcc_range().end;
        start..start + (self.n_bands + 1) * 2
    }

    pub fn pitch_range(&self) -> Range<usize> {
        let start = self.contrast_range().end;
        start..start + PITCH_DIMS
    }
}

/// Summary statistics of the pitch track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchStats {
    pub mean: f32,
    pub std: f32,
    pub median: f32,
    pub max: f32,
    pub min: f32,
}

/// Returns the pitch sub-vector (the last 5 slots, or the whole vector
/// when it is shorter).
pub fn pitch_slice(fingerprint: &[f32]) -> &[f32] {
    &fingerprint[fingerprint.len().saturating_sub(PITCH_DIMS)..]
}

/// Decodes the trailing pitch statistics, or `None` if the fingerprint
/// has fewer than 5 dimensions.
pub fn pitch_stats(fingerprint: &[f32]) -> Option<PitchStats> {
    if fingerprint.len() < PITCH_DIMS {
        return None;
    }
    let p = pitch_slice(fingerprint);
    Some(PitchStats {
        mean: p[0],
        std: p[1],
        median: p[2],
        max: p[3],
        min: p[4],
    })
}
