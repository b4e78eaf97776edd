//! Known-fraudster registry commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use voxtrace_cli::parse_meta_pairs;
use voxtrace_matcher::Metadata;

use super::{load_input, output_result, print_info, print_success, Engine};
use crate::Cli;

/// Manage the known-fraudster registry.
///
/// Registry entries are stamped with is_fraudster and date_marked.
#[derive(Args)]
pub struct FraudsterCommand {
    #[command(subcommand)]
    command: FraudsterSubcommand,
}

#[derive(Subcommand)]
enum FraudsterSubcommand {
    /// Register a fingerprint file (-f) as a known fraudster
    Add {
        /// Fraudster identifier
        id: String,
        /// Extra metadata as key=value (repeatable)
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,
    },
    /// Delete a registry entry
    Remove {
        /// Fraudster identifier
        id: String,
    },
    /// List registry entries
    List,
}

#[derive(Serialize)]
struct FraudsterView<'a> {
    id: &'a str,
    dim: usize,
    metadata: &'a Metadata,
}

impl FraudsterCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            FraudsterSubcommand::Add { id, meta } => {
                let extra = parse_meta_pairs(meta.as_slice())?;
                let (fingerprint, metadata) = load_input(cli)?.into_parts(extra);

                let mut engine = Engine::open(cli)?;
                engine
                    .matcher
                    .add_known_fraudster(id.as_str(), fingerprint, metadata)?;
                engine.save()?;
                print_success(&format!("Fraudster \"{}\" registered", id));
                Ok(())
            }

            FraudsterSubcommand::Remove { id } => {
                let mut engine = Engine::open(cli)?;
                match engine.matcher.remove_known_fraudster(id) {
                    Some(_) => {
                        engine.save()?;
                        print_success(&format!("Fraudster \"{}\" removed", id));
                    }
                    None => print_info(&format!("Fraudster \"{}\" not found", id)),
                }
                Ok(())
            }

            FraudsterSubcommand::List => {
                let engine = Engine::open(cli)?;
                let views: Vec<FraudsterView> = engine
                    .matcher
                    .fraudsters()
                    .iter()
                    .map(|r| FraudsterView {
                        id: &r.id,
                        dim: r.fingerprint.len(),
                        metadata: &r.metadata,
                    })
                    .collect();
                output_result(cli, &views)
            }
        }
    }
}
