//! Manipulation and fraud-risk commands.

use clap::Args;

use super::{load_input, output_result, Engine, Verdict};
use crate::Cli;

/// Score a fingerprint file (-f) for voice manipulation against every
/// stored sample.
#[derive(Args)]
pub struct ManipulationCommand {}

impl ManipulationCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let input = load_input(cli)?;
        let engine = Engine::open(cli)?;
        let assessment = engine
            .matcher
            .detect_voice_manipulation(input.fingerprint(), None)?;
        output_result(cli, &Verdict::new(&assessment))
    }
}

/// Score a fingerprint file (-f) against the known-fraudster registry.
///
/// Scored checks are appended to the history.
#[derive(Args)]
pub struct FraudCommand {
    /// Minimum similarity for a registry hit (default from config, 0.5)
    #[arg(long)]
    threshold: Option<f32>,
}

impl FraudCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let input = load_input(cli)?;
        let mut engine = Engine::open(cli)?;
        let assessment = engine
            .matcher
            .calculate_fraud_probability(input.fingerprint(), self.threshold)?;
        if assessment.level().is_some() {
            engine.save()?;
        }
        output_result(cli, &Verdict::new(&assessment))
    }
}
