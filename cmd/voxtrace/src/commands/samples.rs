//! Voice sample commands.

use clap::Args;
use serde::Serialize;
use voxtrace_cli::parse_meta_pairs;
use voxtrace_matcher::{Metadata, Record};

use super::{load_input, output_result, print_info, print_success, Engine};
use crate::Cli;

/// Store a voice sample from a fingerprint file (-f).
///
/// Re-adding an existing id replaces its fingerprint and metadata.
#[derive(Args)]
pub struct AddCommand {
    /// Sample identifier
    id: String,
    /// Extra metadata as key=value (repeatable)
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    meta: Vec<String>,
}

impl AddCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let extra = parse_meta_pairs(self.meta.as_slice())?;
        let (fingerprint, metadata) = load_input(cli)?.into_parts(extra);
        let dim = fingerprint.len();

        let mut engine = Engine::open(cli)?;
        let replaced = engine
            .matcher
            .add_fingerprint(self.id.as_str(), fingerprint, metadata)?;
        engine.save()?;

        if replaced.is_some() {
            print_success(&format!("Sample \"{}\" replaced ({} dims)", self.id, dim));
        } else {
            print_success(&format!("Sample \"{}\" added ({} dims)", self.id, dim));
        }
        Ok(())
    }
}

/// Delete a voice sample.
#[derive(Args)]
pub struct RemoveCommand {
    /// Sample identifier
    id: String,
}

impl RemoveCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut engine = Engine::open(cli)?;
        match engine.matcher.remove_fingerprint(&self.id) {
            Some(_) => {
                engine.save()?;
                print_success(&format!("Sample \"{}\" removed", self.id));
            }
            None => print_info(&format!("Sample \"{}\" not found", self.id)),
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SampleView<'a> {
    id: &'a str,
    dim: usize,
    is_known_fraudster: bool,
    metadata: &'a Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprint: Option<&'a [f32]>,
}

impl<'a> SampleView<'a> {
    fn new(record: &'a Record, engine: &Engine, with_fingerprint: bool) -> Self {
        Self {
            id: &record.id,
            dim: record.fingerprint.len(),
            is_known_fraudster: engine.matcher.is_known_fraudster(&record.id),
            metadata: &record.metadata,
            fingerprint: with_fingerprint.then_some(record.fingerprint.as_slice()),
        }
    }
}

/// Show a stored sample with its fingerprint.
#[derive(Args)]
pub struct ShowCommand {
    /// Sample identifier
    id: String,
}

impl ShowCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let engine = Engine::open(cli)?;
        let record = engine
            .matcher
            .sample(&self.id)
            .ok_or_else(|| anyhow::anyhow!("sample '{}' not found", self.id))?;
        output_result(cli, &SampleView::new(record, &engine, true))
    }
}

/// List stored samples in insertion order.
#[derive(Args)]
pub struct ListCommand {}

impl ListCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let engine = Engine::open(cli)?;
        let views: Vec<SampleView> = engine
            .matcher
            .samples()
            .iter()
            .map(|r| SampleView::new(r, &engine, false))
            .collect();
        output_result(cli, &views)
    }
}
