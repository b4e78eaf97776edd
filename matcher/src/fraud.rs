use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::search::{find_matches, SearchOptions};
use crate::store::FraudsterRegistry;
use crate::MatchError;

/// Default minimum similarity for a registry hit to count.
pub const DEFAULT_FRAUD_THRESHOLD: f32 = 0.5;

/// Number of registry hits at which the match weight saturates.
const MATCH_SATURATION: f32 = 3.0;
/// Share of the probability carried by the best similarity alone.
const BASE_WEIGHT: f32 = 0.7;
/// Share of the probability carried by the number of hits.
const COUNT_WEIGHT: f32 = 0.3;

/// Verdict bucket for a fraud probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudLevel {
    VeryHigh,
    High,
    Moderate,
    Low,
    VeryLow,
}

impl FraudLevel {
    pub fn from_probability(p: f32) -> Self {
        if p > 0.85 {
            Self::VeryHigh
        } else if p > 0.7 {
            Self::High
        } else if p > 0.5 {
            Self::Moderate
        } else if p > 0.3 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }
}

impl fmt::Display for FraudLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VeryHigh => write!(f, "very high probability of fraud"),
            Self::High => write!(f, "high probability of fraud"),
            Self::Moderate => write!(f, "moderate probability of fraud"),
            Self::Low => write!(f, "low probability of fraud"),
            Self::VeryLow => write!(f, "very low probability of fraud"),
        }
    }
}

/// Outcome of a fraud-probability calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FraudAssessment {
    /// The fraudster registry is empty.
    NoKnownFraudsters,
    /// No registry entry reached the threshold.
    NoMatches,
    Scored {
        probability: f32,
        highest_similarity: f32,
        num_matches: usize,
        level: FraudLevel,
    },
}

impl FraudAssessment {
    /// The fraud probability, 0 for the sentinel outcomes.
    pub fn probability(&self) -> f32 {
        match self {
            Self::NoKnownFraudsters | Self::NoMatches => 0.0,
            Self::Scored { probability, .. } => *probability,
        }
    }

    pub fn level(&self) -> Option<FraudLevel> {
        match self {
            Self::Scored { level, .. } => Some(*level),
            _ => None,
        }
    }
}

impl fmt::Display for FraudAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoKnownFraudsters => write!(f, "no known fraudsters"),
            Self::NoMatches => write!(f, "no matches"),
            Self::Scored { level, .. } => write!(f, "{level}"),
        }
    }
}

/// One scored fraud check. Appended for every [`FraudAssessment::Scored`]
/// outcome and never pruned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub highest_similarity: f32,
    pub num_matches: usize,
    pub fraud_probability: f32,
}

/// Combines the best similarity and the number of hits into a probability:
/// `highest * (0.7 + 0.3 * min(1, n / 3))`.
pub fn fraud_probability(highest_similarity: f32, num_matches: usize) -> f32 {
    let match_weight = (num_matches as f32 / MATCH_SATURATION).min(1.0);
    highest_similarity * (BASE_WEIGHT + COUNT_WEIGHT * match_weight)
}

/// Scores `query` against the registry. Returns the assessment and, when
/// it was scored, the history entry to record.
pub fn assess(
    registry: &FraudsterRegistry,
    query: &[f32],
    threshold: f32,
) -> Result<(FraudAssessment, Option<MatchHistoryEntry>), MatchError> {
    if registry.is_empty() {
        return Ok((FraudAssessment::NoKnownFraudsters, None));
    }

    let matches = find_matches(
        registry.as_store(),
        query,
        &SearchOptions::with_threshold(threshold),
    )?;
    let Some(best) = matches.first() else {
        return Ok((FraudAssessment::NoMatches, None));
    };

    let highest = best.similarity;
    let n = matches.len();
    let probability = fraud_probability(highest, n);
    let entry = MatchHistoryEntry {
        timestamp: Utc::now(),
        highest_similarity: highest,
        num_matches: n,
        fraud_probability: probability,
    };
    let assessment = FraudAssessment::Scored {
        probability,
        highest_similarity: highest,
        num_matches: n,
        level: FraudLevel::from_probability(probability),
    };
    Ok((assessment, Some(entry)))
}
