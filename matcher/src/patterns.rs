use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::cluster::group_similar_voices;
use crate::similarity::cosine_sim;
use crate::store::{Record, RecordStore};
use crate::MatchError;

/// DBSCAN radius used for the cluster count.
const PATTERN_EPS: f32 = 0.3;
/// DBSCAN density used for the cluster count.
const PATTERN_MIN_SAMPLES: usize = 2;
/// Values kept per metadata key.
const TOP_VALUES: usize = 3;

/// A metadata value and how many selected samples carry it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: Value,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternSummary {
    /// Number of selected ids present in the store.
    pub sample_count: usize,
    /// Mean cosine similarity over all ordered pairs of distinct samples.
    pub average_similarity: f32,
    /// Number of label groups (noise included) over the whole store.
    pub cluster_count: usize,
    /// Metadata keys whose most frequent value repeats, with up to 3 values.
    pub common_patterns: BTreeMap<String, Vec<ValueCount>>,
}

/// Outcome of [`analyze_voice_patterns`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PatternAnalysis {
    /// Fewer than two ids were requested, or fewer than two exist.
    InsufficientSamples { requested: usize, valid: usize },
    Summary(PatternSummary),
}

impl fmt::Display for PatternAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientSamples { requested, .. } if *requested < 2 => {
                write!(f, "need at least 2 samples for pattern analysis")
            }
            Self::InsufficientSamples { .. } => write!(f, "not enough valid samples found"),
            Self::Summary(s) => write!(
                f,
                "{} samples, average similarity {:.4}, {} clusters, {} common patterns",
                s.sample_count,
                s.average_similarity,
                s.cluster_count,
                s.common_patterns.len()
            ),
        }
    }
}

/// Summarises how similar a set of samples are and which metadata values
/// they share. `ids` of `None` (or empty) selects the whole store.
pub fn analyze_voice_patterns(
    store: &RecordStore,
    ids: Option<&[&str]>,
) -> Result<PatternAnalysis, MatchError> {
    let selected: Vec<&str> = match ids {
        Some(ids) if !ids.is_empty() => ids.to_vec(),
        _ => store.ids().collect(),
    };
    if selected.len() < 2 {
        return Ok(PatternAnalysis::InsufficientSamples {
            requested: selected.len(),
            valid: selected.iter().filter(|id| store.contains(id)).count(),
        });
    }

    let records: Vec<&Record> = selected.iter().filter_map(|id| store.get(id)).collect();
    if records.len() < 2 {
        return Ok(PatternAnalysis::InsufficientSamples {
            requested: selected.len(),
            valid: records.len(),
        });
    }

    let average_similarity = average_pairwise_similarity(&records)?;
    let cluster_count = group_similar_voices(store, PATTERN_EPS, PATTERN_MIN_SAMPLES)?.len();
    let common_patterns = common_metadata(&records);

    Ok(PatternAnalysis::Summary(PatternSummary {
        sample_count: records.len(),
        average_similarity,
        cluster_count,
        common_patterns,
    }))
}

/// Mean of the off-diagonal entries of the symmetric cosine matrix.
fn average_pairwise_similarity(records: &[&Record]) -> Result<f32, MatchError> {
    let n = records.len();
    let mut sum = 0.0f64;
    for i in 0..n {
        for j in i + 1..n {
            let (a, b) = (&records[i].fingerprint, &records[j].fingerprint);
            MatchError::check_dim(a.len(), b.len())?;
            // Each unordered pair stands for (i, j) and (j, i).
            sum += 2.0 * cosine_sim(a, b) as f64;
        }
    }
    Ok((sum / (n * (n - 1)) as f64) as f32)
}

fn common_metadata(records: &[&Record]) -> BTreeMap<String, Vec<ValueCount>> {
    // key -> values in first-seen order with their counts
    let mut tallies: BTreeMap<&str, Vec<ValueCount>> = BTreeMap::new();
    for record in records {
        for (key, value) in &record.metadata {
            let tally = tallies.entry(key.as_str()).or_default();
            match tally.iter_mut().find(|vc| &vc.value == value) {
                Some(vc) => vc.count += 1,
                None => tally.push(ValueCount {
                    value: value.clone(),
                    count: 1,
                }),
            }
        }
    }

    tallies
        .into_iter()
        .filter_map(|(key, mut tally)| {
            // Stable: equal counts keep first-seen order.
            tally.sort_by(|a, b| b.count.cmp(&a.count));
            tally.truncate(TOP_VALUES);
            let top = tally.first()?;
            (top.count > 1).then(|| (key.to_string(), tally))
        })
        .collect()
}
