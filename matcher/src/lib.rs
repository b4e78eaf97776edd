//! Voice fingerprint matching and fraud-risk scoring.
//!
//! Fingerprints are fixed-length acoustic feature vectors produced by an
//! upstream extractor (see [`FeatureLayout`]). The engine keeps them in an
//! in-memory store and answers questions about a query vector with
//! brute-force linear scans:
//!
//! - which stored samples sound alike ([`VoiceMatcher::find_matches`]);
//! - which samples form dense groups ([`VoiceMatcher::group_similar_voices`], DBSCAN);
//! - whether the voice looks altered ([`VoiceMatcher::detect_voice_manipulation`]);
//! - how likely it belongs to a known fraudster ([`VoiceMatcher::calculate_fraud_probability`]).
//!
//! # Usage
//!
//! ```
//! use voxtrace_matcher::{Config, VoiceMatcher};
//!
//! let mut m = VoiceMatcher::new(Config::default());
//! m.add_fingerprint("call-1", vec![0.9, 0.1, 0.3], None).unwrap();
//! m.add_known_fraudster("fr-7", vec![0.88, 0.12, 0.31], None).unwrap();
//!
//! let query = [0.9, 0.1, 0.3];
//! let matches = m.find_matches(&query, &m.search_options()).unwrap();
//! assert_eq!(matches[0].id, "call-1");
//!
//! let risk = m.calculate_fraud_probability(&query, None).unwrap();
//! assert!(risk.probability() > 0.5);
//! ```
//!
//! Insufficient data (an empty registry, no reference set, fewer than two
//! samples) is reported through result variants, never as an error.

mod cluster;
mod error;
mod fraud;
mod layout;
mod manipulation;
mod matcher;
mod patterns;
mod persist;
mod report;
mod search;
mod similarity;
mod store;

pub use cluster::{ClusterAssignment, NOISE};
pub use error::MatchError;
pub use fraud::{
    fraud_probability, FraudAssessment, FraudLevel, MatchHistoryEntry, DEFAULT_FRAUD_THRESHOLD,
};
pub use layout::{pitch_slice, pitch_stats, FeatureLayout, PitchStats, PITCH_DIMS};
pub use manipulation::{detect_voice_manipulation, ManipulationAssessment, ManipulationLevel};
pub use matcher::{Config, Stats, VoiceMatcher, DEFAULT_FRAUDSTER_MATCH_THRESHOLD};
pub use patterns::{PatternAnalysis, PatternSummary, ValueCount};
pub use persist::{EngineSnapshot, SNAPSHOT_VERSION};
pub use report::{MatchReport, ReportEntry, ReportFormat};
pub use search::{find_matches, Match, SearchOptions};
pub use similarity::{cosine_distance, similarity, SimilarityMethod};
pub use store::{
    FingerprintStore, FraudsterRegistry, Metadata, Record, RecordStore, DATE_MARKED_KEY,
    IS_FRAUDSTER_KEY,
};
