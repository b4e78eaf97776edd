use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cluster::{self, ClusterAssignment};
use crate::fraud::{self, FraudAssessment, MatchHistoryEntry};
use crate::manipulation::{self, ManipulationAssessment};
use crate::patterns::{self, PatternAnalysis};
use crate::persist::{self, EngineSnapshot, SNAPSHOT_VERSION};
use crate::report::{self, MatchReport, ReportFormat};
use crate::search::{self, Match, SearchOptions};
use crate::store::{FraudsterRegistry, Metadata, Record, RecordStore};
use crate::MatchError;

/// Default minimum similarity for registry searches.
pub const DEFAULT_FRAUDSTER_MATCH_THRESHOLD: f32 = 0.7;

/// Controls engine behavior. Zero values fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Expected fingerprint dimension (58 for the default feature layout).
    /// 0 disables the check at insertion; mismatches then surface when
    /// vectors are compared.
    pub dim: usize,

    /// Minimum similarity for [`VoiceMatcher::find_matches`].
    /// Default: 0.8. Zero means unset, so a zero threshold cannot be
    /// configured here; pass it per call through [`SearchOptions`].
    pub threshold: f32,

    /// Minimum similarity for a registry hit to count towards the fraud
    /// probability. Default: 0.5. Zero means unset; pass an explicit
    /// threshold to [`VoiceMatcher::calculate_fraud_probability`] instead.
    pub fraud_threshold: f32,

    /// Maximum number of search results. Default: 10.
    pub limit: usize,

    /// DBSCAN radius in cosine distance. Default: 0.3.
    pub eps: f32,

    /// Minimum neighbourhood size (the point included) of a DBSCAN core
    /// point. Default: 2.
    pub min_samples: usize,
}

impl Config {
    pub fn with_defaults(mut self) -> Self {
        if self.threshold == 0.0 {
            self.threshold = 0.8;
        }
        if self.fraud_threshold == 0.0 {
            self.fraud_threshold = fraud::DEFAULT_FRAUD_THRESHOLD;
        }
        if self.limit == 0 {
            self.limit = 10;
        }
        if self.eps == 0.0 {
            self.eps = 0.3;
        }
        if self.min_samples == 0 {
            self.min_samples = 2;
        }
        self
    }
}

/// Collection sizes reported by [`VoiceMatcher::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub samples: usize,
    pub fraudsters: usize,
    pub history: usize,
}

/// The matching engine: the sample store, the fraudster registry and the
/// fraud-check history, plus every operation over them.
///
/// Not internally synchronized. Mutations take `&mut self`.
#[derive(Debug, Clone)]
pub struct VoiceMatcher {
    cfg: Config,
    samples: RecordStore,
    fraudsters: FraudsterRegistry,
    history: Vec<MatchHistoryEntry>,
}

impl Default for VoiceMatcher {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl VoiceMatcher {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg: cfg.with_defaults(),
            samples: RecordStore::new(),
            fraudsters: FraudsterRegistry::new(),
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Search options built from the configured threshold and limit.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            threshold: self.cfg.threshold,
            limit: self.cfg.limit,
            ..SearchOptions::default()
        }
    }

    /// Search options for registry lookups (threshold 0.7).
    pub fn fraudster_search_options(&self) -> SearchOptions {
        SearchOptions {
            threshold: DEFAULT_FRAUDSTER_MATCH_THRESHOLD,
            limit: self.cfg.limit,
            ..SearchOptions::default()
        }
    }

    fn check_insert_dim(&self, id: &str, fingerprint: &[f32]) -> Result<(), MatchError> {
        if self.cfg.dim == 0 {
            return Ok(());
        }
        MatchError::check_dim(self.cfg.dim, fingerprint.len()).inspect_err(|_| {
            warn!(
                id,
                expected = self.cfg.dim,
                got = fingerprint.len(),
                "rejected fingerprint"
            );
        })
    }

    /// Stores a sample, replacing any record with the same id.
    /// Returns the replaced record.
    pub fn add_fingerprint(
        &mut self,
        id: impl Into<String>,
        fingerprint: Vec<f32>,
        metadata: Option<Metadata>,
    ) -> Result<Option<Record>, MatchError> {
        let id = id.into();
        self.check_insert_dim(&id, &fingerprint)?;
        debug!(id = %id, dim = fingerprint.len(), "add fingerprint");
        Ok(self.samples.add(id, fingerprint, metadata))
    }

    pub fn remove_fingerprint(&mut self, id: &str) -> Option<Record> {
        self.samples.remove(id)
    }

    pub fn sample(&self, id: &str) -> Option<&Record> {
        self.samples.get(id)
    }

    pub fn samples(&self) -> &RecordStore {
        &self.samples
    }

    /// Registers a known fraudster. The record is stamped with
    /// `is_fraudster` and `date_marked` unless the metadata has them.
    pub fn add_known_fraudster(
        &mut self,
        id: impl Into<String>,
        fingerprint: Vec<f32>,
        metadata: Option<Metadata>,
    ) -> Result<Option<Record>, MatchError> {
        let id = id.into();
        self.check_insert_dim(&id, &fingerprint)?;
        info!(id = %id, "registered known fraudster");
        Ok(self.fraudsters.add(id, fingerprint, metadata))
    }

    pub fn remove_known_fraudster(&mut self, id: &str) -> Option<Record> {
        let removed = self.fraudsters.remove(id);
        if removed.is_some() {
            info!(id, "removed known fraudster");
        }
        removed
    }

    pub fn known_fraudster(&self, id: &str) -> Option<&Record> {
        self.fraudsters.get(id)
    }

    pub fn is_known_fraudster(&self, id: &str) -> bool {
        self.fraudsters.contains(id)
    }

    pub fn fraudsters(&self) -> &FraudsterRegistry {
        &self.fraudsters
    }

    /// Searches the sample store. See [`search::find_matches`].
    pub fn find_matches(
        &self,
        query: &[f32],
        opts: &SearchOptions,
    ) -> Result<Vec<Match>, MatchError> {
        search::find_matches(&self.samples, query, opts)
    }

    /// Searches the fraudster registry.
    pub fn find_fraudster_matches(
        &self,
        query: &[f32],
        opts: &SearchOptions,
    ) -> Result<Vec<Match>, MatchError> {
        search::find_matches(self.fraudsters.as_store(), query, opts)
    }

    /// Clusters every stored sample. `None` uses the configured value.
    pub fn group_similar_voices(
        &self,
        eps: Option<f32>,
        min_samples: Option<usize>,
    ) -> Result<ClusterAssignment, MatchError> {
        cluster::group_similar_voices(
            &self.samples,
            eps.unwrap_or(self.cfg.eps),
            min_samples.unwrap_or(self.cfg.min_samples),
        )
    }

    /// Scores `fingerprint` for manipulation. The reference set defaults to
    /// every stored sample.
    pub fn detect_voice_manipulation(
        &self,
        fingerprint: &[f32],
        reference: Option<&[&[f32]]>,
    ) -> Result<ManipulationAssessment, MatchError> {
        match reference {
            Some(reference) => manipulation::detect_voice_manipulation(fingerprint, reference),
            None => {
                let all = self.samples.fingerprints();
                manipulation::detect_voice_manipulation(fingerprint, &all)
            }
        }
    }

    /// Scores `query` against the fraudster registry and records the check
    /// in the history when it produced a probability.
    pub fn calculate_fraud_probability(
        &mut self,
        query: &[f32],
        threshold: Option<f32>,
    ) -> Result<FraudAssessment, MatchError> {
        let threshold = threshold.unwrap_or(self.cfg.fraud_threshold);
        let (assessment, entry) = fraud::assess(&self.fraudsters, query, threshold)?;
        if let Some(entry) = entry {
            debug!(
                probability = entry.fraud_probability,
                matches = entry.num_matches,
                "fraud check recorded"
            );
            self.history.push(entry);
        }
        Ok(assessment)
    }

    pub fn match_history(&self) -> &[MatchHistoryEntry] {
        &self.history
    }

    /// See [`patterns::analyze_voice_patterns`].
    pub fn analyze_voice_patterns(
        &self,
        ids: Option<&[&str]>,
    ) -> Result<PatternAnalysis, MatchError> {
        patterns::analyze_voice_patterns(&self.samples, ids)
    }

    /// Renders a report for `matches` in `format` ("json", "csv" or
    /// "text"), writing it to `path` when given. An unknown format fails
    /// with [`MatchError::InvalidArgument`] before any file is touched.
    pub fn export_match_report(
        &self,
        matches: &[Match],
        format: &str,
        path: Option<&Path>,
    ) -> Result<String, MatchError> {
        let format: ReportFormat = format.parse()?;
        let report = MatchReport::build(matches, &self.samples, &self.fraudsters);
        report::export(&report, format, path)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            version: SNAPSHOT_VERSION,
            samples: self.samples.to_records(),
            fraudsters: self.fraudsters.as_store().to_records(),
            match_history: self.history.clone(),
        }
    }

    /// Persists the full engine state to `path`.
    pub fn save(&self, path: &Path) -> Result<(), MatchError> {
        persist::save_snapshot(&self.snapshot(), path)
    }

    /// Replaces the engine state with the snapshot at `path`.
    /// Returns false, leaving the engine untouched, when no file exists.
    pub fn load(&mut self, path: &Path) -> Result<bool, MatchError> {
        let Some(snapshot) = persist::load_snapshot(path)? else {
            debug!(path = %path.display(), "no snapshot to load");
            return Ok(false);
        };
        self.samples = RecordStore::from_records(snapshot.samples);
        self.fraudsters = FraudsterRegistry::from_records(snapshot.fraudsters);
        self.history = snapshot.match_history;
        Ok(true)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            samples: self.samples.len(),
            fraudsters: self.fraudsters.len(),
            history: self.history.len(),
        }
    }

    /// Drops every sample, fraudster and history entry.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.fraudsters.clear();
        self.history.clear();
    }
}
