//! Clustering and pattern analysis commands.

use clap::Args;
use voxtrace_matcher::{PatternAnalysis, NOISE};

use super::{output_result, print_info, print_warning, Engine, Verdict};
use crate::Cli;

/// Group stored samples with DBSCAN over cosine distance.
///
/// Samples outside any dense group are listed under label -1.
#[derive(Args)]
pub struct ClusterCommand {
    /// Neighbourhood radius in cosine distance (default from config, 0.3)
    #[arg(long)]
    eps: Option<f32>,
    /// Minimum neighbourhood size, the sample included (default from config, 2)
    #[arg(long)]
    min_samples: Option<usize>,
}

impl ClusterCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let engine = Engine::open(cli)?;
        let groups = engine
            .matcher
            .group_similar_voices(self.eps, self.min_samples)?;

        let dense = groups.keys().filter(|&&label| label != NOISE).count();
        let noise = groups.get(&NOISE).map_or(0, Vec::len);
        print_info(&format!("{} clusters, {} noise samples", dense, noise));
        output_result(cli, &groups)
    }
}

/// Summarise similarity and shared metadata across samples.
///
/// Without ids, every stored sample is analysed.
#[derive(Args)]
pub struct PatternsCommand {
    /// Sample identifiers
    ids: Vec<String>,
}

impl PatternsCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let engine = Engine::open(cli)?;
        let ids: Vec<&str> = self.ids.iter().map(String::as_str).collect();
        let selection = (!ids.is_empty()).then_some(ids.as_slice());

        let analysis = engine.matcher.analyze_voice_patterns(selection)?;
        if let PatternAnalysis::InsufficientSamples { .. } = analysis {
            print_warning(&analysis.to_string());
        }
        output_result(cli, &Verdict::new(&analysis))
    }
}
