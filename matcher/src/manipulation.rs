use std::fmt;

use serde::Serialize;

use crate::layout::pitch_slice;
use crate::MatchError;

/// Weight of the pitch-variance score in the final score.
const PITCH_WEIGHT: f64 = 0.7;
/// Weight of the per-dimension extremity score in the final score.
const EXTREMITY_WEIGHT: f64 = 0.3;
/// z-scores above this count towards extremity.
const Z_LIMIT: f64 = 3.0;
/// z-score excess that saturates one dimension's contribution.
const Z_SPAN: f64 = 5.0;

/// Verdict bucket for a manipulation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManipulationLevel {
    High,
    Moderate,
    Low,
    LikelyNatural,
}

impl ManipulationLevel {
    pub fn from_score(score: f32) -> Self {
        if score > 0.8 {
            Self::High
        } else if score > 0.5 {
            Self::Moderate
        } else if score > 0.3 {
            Self::Low
        } else {
            Self::LikelyNatural
        }
    }
}

impl fmt::Display for ManipulationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high probability of voice manipulation"),
            Self::Moderate => write!(f, "moderate probability of voice manipulation"),
            Self::Low => write!(f, "low probability of voice manipulation"),
            Self::LikelyNatural => write!(f, "likely natural voice"),
        }
    }
}

/// Outcome of [`detect_voice_manipulation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ManipulationAssessment {
    /// The reference population was empty; nothing to compare against.
    NoReference,
    Scored {
        /// Pitch variance of the query relative to the reference, in [0, 1].
        manipulation_score: f32,
        /// Share of dimensions that are statistical outliers, in [0, 1].
        extremity_score: f32,
        /// 0.7 * manipulation_score + 0.3 * extremity_score.
        final_score: f32,
        level: ManipulationLevel,
    },
}

impl ManipulationAssessment {
    /// The final score, 0 when there was no reference.
    pub fn score(&self) -> f32 {
        match self {
            Self::NoReference => 0.0,
            Self::Scored { final_score, .. } => *final_score,
        }
    }

    pub fn level(&self) -> Option<ManipulationLevel> {
        match self {
            Self::NoReference => None,
            Self::Scored { level, .. } => Some(*level),
        }
    }
}

impl fmt::Display for ManipulationAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoReference => write!(f, "no reference fingerprints available"),
            Self::Scored { level, .. } => write!(f, "{level}"),
        }
    }
}

/// Scores how likely `fingerprint` is a disguised or altered voice,
/// compared to a reference population.
///
/// Two signals are combined:
/// - pitch variance: the variance of the last 5 (pitch) slots against
///   twice the mean pitch variance of the reference set;
/// - extremity: for every dimension, how far beyond 3 standard deviations
///   the query lies from the reference mean.
///
/// Every reference vector must have the query's dimension.
pub fn detect_voice_manipulation(
    fingerprint: &[f32],
    reference: &[&[f32]],
) -> Result<ManipulationAssessment, MatchError> {
    if reference.is_empty() {
        return Ok(ManipulationAssessment::NoReference);
    }
    for r in reference {
        MatchError::check_dim(fingerprint.len(), r.len())?;
    }

    let query_var = variance(pitch_slice(fingerprint).iter().map(|&x| x as f64));
    let ref_var = reference
        .iter()
        .map(|r| variance(pitch_slice(r).iter().map(|&x| x as f64)))
        .sum::<f64>()
        / reference.len() as f64;

    let manipulation = if ref_var > 0.0 {
        (query_var / (2.0 * ref_var)).min(1.0)
    } else {
        0.0
    };

    let dim = fingerprint.len();
    let mut extremity = 0.0f64;
    for (i, &q) in fingerprint.iter().enumerate() {
        let column = reference.iter().map(|r| r[i] as f64);
        let (mean, std) = mean_std(column);
        let std = if std == 0.0 { 1.0 } else { std };
        let z = (q as f64 - mean).abs() / std;
        if z > Z_LIMIT {
            extremity += ((z - Z_LIMIT) / Z_SPAN).min(1.0);
        }
    }
    let extremity = if dim > 0 {
        (extremity / dim as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let final_score = (PITCH_WEIGHT * manipulation + EXTREMITY_WEIGHT * extremity) as f32;
    Ok(ManipulationAssessment::Scored {
        manipulation_score: manipulation as f32,
        extremity_score: extremity as f32,
        final_score,
        level: ManipulationLevel::from_score(final_score),
    })
}

/// Population mean and standard deviation. Empty input yields (0, 0).
fn mean_std(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    let var = values.map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
    (mean, var.sqrt())
}

fn variance(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let (_, std) = mean_std(values);
    std * std
}
