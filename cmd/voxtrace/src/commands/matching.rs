//! Similarity search command.

use std::path::Path;

use clap::Args;
use voxtrace_matcher::{ReportFormat, SimilarityMethod};

use super::{load_input, output_result, print_info, print_success, Engine};
use crate::Cli;

/// Find stored samples similar to a fingerprint file (-f).
///
/// With --format or --report the matches are exported as a report
/// (json, csv or text) instead of the usual YAML/JSON listing.
#[derive(Args)]
pub struct MatchCommand {
    /// Minimum similarity (default from config, 0.8; 0.7 with --fraudsters)
    #[arg(long)]
    threshold: Option<f32>,
    /// Maximum number of results (default from config, 10)
    #[arg(long)]
    limit: Option<usize>,
    /// Similarity metric: cosine or euclidean
    #[arg(long, default_value = "cosine")]
    method: SimilarityMethod,
    /// Search the fraudster registry instead of the sample store
    #[arg(long)]
    fraudsters: bool,
    /// Report format: json, csv or text
    #[arg(long)]
    format: Option<String>,
    /// Write the report to this file
    #[arg(long)]
    report: Option<String>,
}

impl MatchCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let input = load_input(cli)?;
        let engine = Engine::open(cli)?;
        let m = &engine.matcher;

        let mut opts = if self.fraudsters {
            m.fraudster_search_options()
        } else {
            m.search_options()
        };
        if let Some(t) = self.threshold {
            opts.threshold = t;
        }
        if let Some(limit) = self.limit {
            opts.limit = limit;
        }
        opts.method = self.method;

        let matches = if self.fraudsters {
            m.find_fraudster_matches(input.fingerprint(), &opts)?
        } else {
            m.find_matches(input.fingerprint(), &opts)?
        };
        if matches.is_empty() {
            print_info("No matches above threshold");
        }

        if self.format.is_none() && self.report.is_none() {
            return output_result(cli, &matches);
        }

        let default_format = ReportFormat::default().to_string();
        let format = self.format.as_deref().unwrap_or(&default_format);
        let report_path = self.report.as_deref().map(Path::new);
        let rendered = m.export_match_report(&matches, format, report_path)?;
        match &self.report {
            Some(path) => print_success(&format!(
                "{} report with {} matches written to {}",
                format,
                matches.len(),
                path
            )),
            None => print!("{}", rendered),
        }
        Ok(())
    }
}
