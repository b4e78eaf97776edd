use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::search::Match;
use crate::store::{FraudsterRegistry, Metadata, RecordStore};
use crate::MatchError;

/// Output format of a match report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
    /// Human-readable listing.
    Text,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "text" | "txt" => Ok(Self::Text),
            other => Err(MatchError::InvalidArgument(format!(
                "unsupported report format: {other}"
            ))),
        }
    }
}

/// One match as it appears in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub sample_id: String,
    pub similarity: f32,
    pub is_known_fraudster: bool,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub report_date: DateTime<Utc>,
    pub match_count: usize,
    pub matches: Vec<ReportEntry>,
}

impl MatchReport {
    /// Joins matches with their metadata and fraudster status.
    ///
    /// Metadata comes from the sample store, falling back to the registry
    /// record when the id only exists there.
    pub fn build(matches: &[Match], samples: &RecordStore, fraudsters: &FraudsterRegistry) -> Self {
        let entries = matches
            .iter()
            .map(|m| {
                let metadata = samples
                    .get(&m.id)
                    .or_else(|| fraudsters.get(&m.id))
                    .map(|r| r.metadata.clone())
                    .unwrap_or_default();
                ReportEntry {
                    sample_id: m.id.clone(),
                    similarity: m.similarity,
                    is_known_fraudster: fraudsters.contains(&m.id),
                    metadata,
                }
            })
            .collect::<Vec<_>>();
        Self {
            report_date: Utc::now(),
            match_count: entries.len(),
            matches: entries,
        }
    }

    pub fn render(&self, format: ReportFormat) -> Result<String, MatchError> {
        match format {
            ReportFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| MatchError::Encode(e.to_string()))
            }
            ReportFormat::Csv => self.render_csv(),
            ReportFormat::Text => Ok(self.to_string()),
        }
    }

    fn render_csv(&self) -> Result<String, MatchError> {
        let encode_err = |e: csv::Error| MatchError::Encode(e.to_string());

        let mut w = csv::Writer::from_writer(Vec::new());
        w.write_record(["sample_id", "similarity", "is_known_fraudster", "metadata"])
            .map_err(encode_err)?;
        for e in &self.matches {
            let similarity = e.similarity.to_string();
            let flag = e.is_known_fraudster.to_string();
            let metadata = serde_json::to_string(&e.metadata)
                .map_err(|err| MatchError::Encode(err.to_string()))?;
            w.write_record([
                e.sample_id.as_str(),
                similarity.as_str(),
                flag.as_str(),
                metadata.as_str(),
            ])
            .map_err(encode_err)?;
        }
        let bytes = w
            .into_inner()
            .map_err(|err| MatchError::Encode(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| MatchError::Encode(err.to_string()))
    }

}

impl fmt::Display for MatchReport {
    /// The human-readable listing used by [`ReportFormat::Text`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Voice Match Report")?;
        writeln!(f, "Generated: {}", self.report_date.to_rfc3339())?;
        writeln!(f, "Total Matches: {}", self.match_count)?;
        writeln!(f)?;
        writeln!(f, "--- Match Details ---")?;
        for (i, e) in self.matches.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "Match #{}:", i + 1)?;
            writeln!(f, "  Sample ID: {}", e.sample_id)?;
            writeln!(f, "  Similarity: {:.4}", e.similarity)?;
            if e.is_known_fraudster {
                writeln!(f, "  WARNING: KNOWN FRAUDSTER")?;
            }
            writeln!(f, "  Metadata:")?;
            for (key, value) in &e.metadata {
                match value.as_str() {
                    Some(s) => writeln!(f, "    {key}: {s}")?,
                    None => writeln!(f, "    {key}: {value}")?,
                }
            }
        }
        Ok(())
    }
}

/// Renders `report` and, when `path` is given, writes it there first
/// (creating or truncating the file).
pub fn export(
    report: &MatchReport,
    format: ReportFormat,
    path: Option<&Path>,
) -> Result<String, MatchError> {
    let output = report.render(format)?;
    if let Some(path) = path {
        let mut file = File::create(path)?;
        file.write_all(output.as_bytes())?;
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn fixtures() -> (RecordStore, FraudsterRegistry, Vec<Match>) {
        let mut samples = RecordStore::new();
        samples.add(
            "call-1",
            vec![1.0, 0.0],
            json!({"caller": "+15550100", "note": "said \"hi\", then hung up"})
                .as_object()
                .cloned(),
        );
        samples.add("call-2", vec![0.0, 1.0], None);
        let mut fraudsters = FraudsterRegistry::new();
        fraudsters.add("call-2", vec![0.0, 1.0], json!({"case": 7}).as_object().cloned());
        fraudsters.add("fr-9", vec![0.5, 0.5], None);
        let matches = vec![
            Match::new("call-1", 0.93),
            Match::new("call-2", 0.81),
            Match::new("fr-9", 0.75),
        ];
        (samples, fraudsters, matches)
    }

    #[test]
    fn format_parse() {
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("csv".parse::<ReportFormat>().unwrap(), ReportFormat::Csv);
        assert_eq!("txt".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert_eq!("text".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert!(matches!(
            "xml".parse::<ReportFormat>(),
            Err(MatchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn build_joins_metadata_and_fraud_flag() {
        let (samples, fraudsters, matches) = fixtures();
        let report = MatchReport::build(&matches, &samples, &fraudsters);
        assert_eq!(report.match_count, 3);

        let e = &report.matches;
        assert!(!e[0].is_known_fraudster);
        assert_eq!(e[0].metadata["caller"], "+15550100");

        // In both stores: sample metadata wins, flag comes from the registry.
        assert!(e[1].is_known_fraudster);
        assert!(e[1].metadata.is_empty());

        // Registry only: metadata falls back to the registry record.
        assert!(e[2].is_known_fraudster);
        assert_eq!(e[2].metadata["is_fraudster"], true);
    }

    #[test]
    fn json_output() {
        let (samples, fraudsters, matches) = fixtures();
        let report = MatchReport::build(&matches, &samples, &fraudsters);
        let out = report.render(ReportFormat::Json).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["match_count"], 3);
        assert_eq!(v["matches"][0]["sample_id"], "call-1");
        assert_eq!(v["matches"][0]["is_known_fraudster"], false);
        assert_eq!(v["matches"][1]["is_known_fraudster"], true);
        assert!(v["report_date"].is_string());
    }

    #[test]
    fn csv_output() {
        let (samples, fraudsters, matches) = fixtures();
        let report = MatchReport::build(&matches, &samples, &fraudsters);
        let out = report.render(ReportFormat::Csv).unwrap();

        let mut rdr = csv::Reader::from_reader(out.as_bytes());
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["sample_id", "similarity", "is_known_fraudster", "metadata"]
        );
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "call-1");
        assert_eq!(&rows[0][2], "false");
        let meta: Value = serde_json::from_str(&rows[0][3]).unwrap();
        assert_eq!(meta["note"], "said \"hi\", then hung up");
        assert_eq!(&rows[1][2], "true");
    }

    #[test]
    fn text_output() {
        let (samples, fraudsters, matches) = fixtures();
        let report = MatchReport::build(&matches, &samples, &fraudsters);
        let out = report.render(ReportFormat::Text).unwrap();
        assert!(out.contains("Total Matches: 3"));
        assert!(out.contains("Match #1:"));
        assert!(out.contains("  Sample ID: call-1"));
        assert!(out.contains("  Similarity: 0.9300"));
        assert!(out.contains("    caller: +15550100"));
        assert_eq!(out.matches("WARNING: KNOWN FRAUDSTER").count(), 2);
    }

    #[test]
    fn export_overwrites_file() {
        let (samples, fraudsters, matches) = fixtures();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, "stale content that is much longer than it should be").unwrap();

        let report = MatchReport::build(&matches[..1], &samples, &fraudsters);
        let out = export(&report, ReportFormat::Json, Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), out);
    }

    #[test]
    fn empty_report() {
        let report = MatchReport::build(&[], &RecordStore::new(), &FraudsterRegistry::new());
        let out = report.render(ReportFormat::Csv).unwrap();
        assert_eq!(out.lines().count(), 1);
    }
}
