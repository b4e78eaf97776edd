use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::MatchError;

/// Metric used to compare two fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMethod {
    /// dot(a, b) / (|a| * |b|).
    #[default]
    Cosine,
    /// 1 / (1 + |a - b|). Range (0, 1], 1 at distance 0.
    Euclidean,
}

impl fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cosine => write!(f, "cosine"),
            Self::Euclidean => write!(f, "euclidean"),
        }
    }
}

impl FromStr for SimilarityMethod {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "euclidean" => Ok(Self::Euclidean),
            other => Err(MatchError::InvalidArgument(format!(
                "unsupported similarity method: {other}"
            ))),
        }
    }
}

/// Computes the similarity between two fingerprints with the given method.
///
/// Fails with [`MatchError::DimensionMismatch`] when the lengths differ.
pub fn similarity(a: &[f32], b: &[f32], method: SimilarityMethod) -> Result<f32, MatchError> {
    MatchError::check_dim(a.len(), b.len())?;
    Ok(match method {
        SimilarityMethod::Cosine => cosine_sim(a, b),
        SimilarityMethod::Euclidean => euclidean_sim(a, b),
    })
}

/// Cosine distance: 1 - cosine_similarity.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f32, MatchError> {
    MatchError::check_dim(a.len(), b.len())?;
    Ok(1.0 - cosine_sim(a, b))
}

/// Cosine similarity of two equal-length vectors.
/// Accumulates in f64; a zero vector has similarity 0 with everything.
pub(crate) fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    let mut dot: f64 = 0.0;
    let mut na: f64 = 0.0;
    let mut nb: f64 = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let x = x as f64;
        let y = y as f64;
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    let denom = na.sqrt() * nb.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (dot / denom) as f32
}

fn euclidean_sim(a: &[f32], b: &[f32]) -> f32 {
    let dist: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt();
    (1.0 / (1.0 + dist)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identical() {
        let a = [0.3, -1.2, 4.0, 0.01];
        let sim = similarity(&a, &a, SimilarityMethod::Cosine).unwrap();
        assert!((sim - 1.0).abs() < 1e-6, "got {sim}");
    }

    #[test]
    fn cosine_orthogonal_and_opposite() {
        let sim = similarity(&[1.0, 0.0], &[0.0, 1.0], SimilarityMethod::Cosine).unwrap();
        assert!(sim.abs() < 1e-6);
        let sim = similarity(&[1.0, 0.0], &[-1.0, 0.0], SimilarityMethod::Cosine).unwrap();
        assert!((sim + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_zero_vector() {
        let sim = similarity(&[0.0, 0.0], &[1.0, 0.0], SimilarityMethod::Cosine).unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn euclidean_identical_is_one() {
        let a = [5.0, 7.5, -2.0];
        let sim = similarity(&a, &a, SimilarityMethod::Euclidean).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn euclidean_decreases_with_distance() {
        let near = similarity(&[0.0, 0.0], &[3.0, 4.0], SimilarityMethod::Euclidean).unwrap();
        assert!((near - 1.0 / 6.0).abs() < 1e-6, "distance 5 -> 1/6, got {near}");
        let far = similarity(&[0.0, 0.0], &[6.0, 8.0], SimilarityMethod::Euclidean).unwrap();
        assert!(far < near);
        assert!(far > 0.0);
    }

    #[test]
    fn dimension_mismatch() {
        for method in [SimilarityMethod::Cosine, SimilarityMethod::Euclidean] {
            let err = similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0], method).unwrap_err();
            assert!(matches!(
                err,
                MatchError::DimensionMismatch { expected: 2, got: 3 }
            ));
        }
        assert!(cosine_distance(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn method_parse() {
        assert_eq!("cosine".parse::<SimilarityMethod>().unwrap(), SimilarityMethod::Cosine);
        assert_eq!(
            " Euclidean ".parse::<SimilarityMethod>().unwrap(),
            SimilarityMethod::Euclidean
        );
        let err = "manhattan".parse::<SimilarityMethod>().unwrap_err();
        assert!(matches!(err, MatchError::InvalidArgument(_)));
        assert_eq!(SimilarityMethod::Euclidean.to_string(), "euclidean");
    }
}
