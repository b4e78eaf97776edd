use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::similarity::{similarity, SimilarityMethod};
use crate::store::RecordStore;
use crate::MatchError;

/// A single result of a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Identifier of the matched record.
    pub id: String,

    /// Similarity between the query and the matched record.
    /// Higher values indicate closer voices.
    pub similarity: f32,
}

impl Match {
    pub fn new(id: impl Into<String>, similarity: f32) -> Self {
        Self {
            id: id.into(),
            similarity,
        }
    }
}

/// Parameters of a linear scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Minimum similarity a result must reach.
    pub threshold: f32,
    pub method: SimilarityMethod,
    /// Maximum number of results, applied after threshold filtering.
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            method: SimilarityMethod::Cosine,
            limit: 10,
        }
    }
}

impl SearchOptions {
    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }
}

/// Scans every record in `store` and returns the matches that reach the
/// threshold, best first, at most `opts.limit` of them.
///
/// Ties keep the store's insertion order.
pub fn find_matches(
    store: &RecordStore,
    query: &[f32],
    opts: &SearchOptions,
) -> Result<Vec<Match>, MatchError> {
    if store.is_empty() || opts.limit == 0 {
        return Ok(Vec::new());
    }

    let mut results = store
        .iter()
        .map(|r| Ok(Match::new(r.id.as_str(), similarity(query, &r.fingerprint, opts.method)?)))
        .collect::<Result<Vec<_>, MatchError>>()?;

    // sort_by is stable, so equal scores stay in insertion order.
    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    results.retain(|m| m.similarity >= opts.threshold);
    results.truncate(opts.limit);

    debug!(
        scanned = store.len(),
        matched = results.len(),
        threshold = opts.threshold,
        method = %opts.method,
        "linear scan complete"
    );
    Ok(results)
}
