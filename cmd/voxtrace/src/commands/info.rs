//! History and statistics commands.

use clap::Args;

use super::{output_result, Engine};
use crate::Cli;

/// Show past fraud checks, oldest first.
#[derive(Args)]
pub struct HistoryCommand {
    /// Only show the most recent N entries
    #[arg(long)]
    last: Option<usize>,
}

impl HistoryCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let engine = Engine::open(cli)?;
        let history = engine.matcher.match_history();
        let skip = self
            .last
            .map_or(0, |n| history.len().saturating_sub(n));
        output_result(cli, &history[skip..])
    }
}

/// Show collection sizes.
#[derive(Args)]
pub struct StatsCommand {}

impl StatsCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let engine = Engine::open(cli)?;
        output_result(cli, &engine.matcher.stats())
    }
}
