use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use crate::similarity::cosine_distance;
use crate::store::RecordStore;
use crate::MatchError;

/// Label assigned to points outside any dense group.
pub const NOISE: i32 = -1;

/// Cluster label → member ids, in store order.
pub type ClusterAssignment = BTreeMap<i32, Vec<String>>;

/// Groups every fingerprint in `store` with DBSCAN over cosine distance.
///
/// Label values depend on iteration order; only membership and the
/// noise/non-noise split are meaningful.
pub fn group_similar_voices(
    store: &RecordStore,
    eps: f32,
    min_samples: usize,
) -> Result<ClusterAssignment, MatchError> {
    let mut groups = ClusterAssignment::new();
    if store.is_empty() {
        return Ok(groups);
    }

    let vectors = store.fingerprints();
    let labels = dbscan(&vectors, eps, min_samples)?;
    for (record, label) in store.iter().zip(&labels) {
        groups.entry(*label).or_default().push(record.id.clone());
    }

    debug!(
        points = labels.len(),
        clusters = groups.keys().filter(|&&l| l != NOISE).count(),
        noise = groups.get(&NOISE).map_or(0, Vec::len),
        eps,
        min_samples,
        "dbscan complete"
    );
    Ok(groups)
}

/// Runs DBSCAN using cosine distance.
///
/// # Parameters
/// - `vectors`: the data points
/// - `eps`: maximum cosine distance (1 - cosine_similarity) for neighbors
/// - `min_pts`: minimum neighborhood size, the point itself included
///
/// # Returns
/// One label per vector. -1 is noise, clusters are numbered from 0.
pub(crate) fn dbscan(vectors: &[&[f32]], eps: f32, min_pts: usize) -> Result<Vec<i32>, MatchError> {
    let n = vectors.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let dim = vectors[0].len();
    for v in vectors {
        MatchError::check_dim(dim, v.len())?;
    }

    const UNDEFINED: i32 = i32::MIN;

    let mut labels = vec![UNDEFINED; n];
    let mut next_cluster: i32 = 0;

    for i in 0..n {
        if labels[i] != UNDEFINED {
            continue;
        }

        let neighbors = range_query(vectors, i, eps)?;
        if neighbors.len() < min_pts {
            labels[i] = NOISE;
            continue;
        }

        let cluster = next_cluster;
        next_cluster += 1;
        labels[i] = cluster;

        let mut seed: VecDeque<usize> = neighbors.into_iter().filter(|&j| j != i).collect();

        while let Some(q) = seed.pop_front() {
            if labels[q] == NOISE {
                // Border point: reachable but not core.
                labels[q] = cluster;
            }
            if labels[q] != UNDEFINED {
                continue;
            }
            labels[q] = cluster;

            let q_neighbors = range_query(vectors, q, eps)?;
            if q_neighbors.len() >= min_pts {
                seed.extend(q_neighbors);
            }
        }
    }

    Ok(labels)
}

/// Returns indices of all vectors within eps cosine distance of vectors[idx].
fn range_query(vectors: &[&[f32]], idx: usize, eps: f32) -> Result<Vec<usize>, MatchError> {
    let q = vectors[idx];
    let mut out = Vec::new();
    for (i, v) in vectors.iter().enumerate() {
        if cosine_distance(q, v)? <= eps {
            out.push(i);
        }
    }
    Ok(out)
}
