//! Utility functions for CLI commands.

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;
use voxtrace_cli::{load_config, load_fingerprint, Config, FingerprintInput, Output, OutputFormat};
use voxtrace_matcher::VoiceMatcher;

use crate::Cli;

const APP_NAME: &str = "voxtrace";

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// An engine loaded from the database file.
pub struct Engine {
    pub matcher: VoiceMatcher,
    path: PathBuf,
}

impl Engine {
    /// Loads the engine configured for this invocation. A missing database
    /// yields an empty engine.
    pub fn open(cli: &Cli) -> anyhow::Result<Self> {
        let cfg = get_config(cli)?;
        let path = match &cli.db {
            Some(db) => PathBuf::from(db),
            None => cfg.database_path(),
        };
        let mut matcher = VoiceMatcher::new(cfg.matcher.clone());
        let loaded = matcher.load(&path)?;
        debug!(path = %path.display(), loaded, "engine opened");
        Ok(Self { matcher, path })
    }

    /// Writes the engine back to the database file.
    pub fn save(&self) -> anyhow::Result<()> {
        self.matcher.save(&self.path)?;
        Ok(())
    }
}

/// Requires input file to be provided.
pub fn require_input_file(cli: &Cli) -> anyhow::Result<&str> {
    cli.input
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("input file is required, use -f flag"))
}

/// Loads the fingerprint named by -f.
pub fn load_input(cli: &Cli) -> anyhow::Result<FingerprintInput> {
    let path = require_input_file(cli)?;
    Ok(load_fingerprint(path)?)
}

/// Outputs result as JSON or YAML.
pub fn output_result<T: Serialize + ?Sized>(cli: &Cli, result: &T) -> anyhow::Result<()> {
    Output::new(OutputFormat::from_json_flag(cli.json), cli.output.clone()).write(result)
}

/// Wraps a result with its human-readable verdict for output.
#[derive(Serialize)]
pub struct Verdict<'a, T: Serialize> {
    #[serde(flatten)]
    pub result: &'a T,
    pub verdict: String,
}

impl<'a, T: Serialize + std::fmt::Display> Verdict<'a, T> {
    pub fn new(result: &'a T) -> Self {
        Self {
            result,
            verdict: result.to_string(),
        }
    }
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Prints info message.
pub fn print_info(msg: &str) {
    eprintln!("\x1b[34mℹ\x1b[0m {}", msg);
}

/// Prints warning message.
pub fn print_warning(msg: &str) {
    eprintln!("\x1b[33m⚠\x1b[0m {}", msg);
}
