//! Voxtrace CLI - voice fingerprint matching and fraud-risk scoring.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{
    AddCommand, ClusterCommand, FraudCommand, FraudsterCommand, HistoryCommand, ListCommand,
    ManipulationCommand, MatchCommand, PatternsCommand, RemoveCommand, ShowCommand, StatsCommand,
};

/// Voxtrace CLI - voice fingerprint matching and fraud-risk scoring.
///
/// Keeps a database of voice fingerprints and a registry of known
/// fraudsters, and answers:
///   - which stored samples sound like a query (match)
///   - which samples group together (cluster, patterns)
///   - whether a voice looks altered (manipulation)
///   - how likely a caller is a known fraudster (fraud)
///
/// Configuration is stored in ~/.voxtrace/voxtrace/config.yaml; the
/// database defaults to ~/.voxtrace/voxtrace/data/voxtrace.db.
#[derive(Parser)]
#[command(name = "voxtrace")]
#[command(about = "Voice fingerprint matching and fraud-risk CLI tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.voxtrace/voxtrace/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Database file (overrides config file)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Input fingerprint file (YAML or JSON, "-" for stdin)
    #[arg(short = 'f', long = "file", global = true)]
    pub input: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a voice sample
    Add(AddCommand),
    /// Delete a voice sample
    Remove(RemoveCommand),
    /// Show a stored sample
    Show(ShowCommand),
    /// List stored samples
    List(ListCommand),
    /// Manage the known-fraudster registry
    Fraudster(FraudsterCommand),
    /// Find stored samples similar to a fingerprint
    Match(MatchCommand),
    /// Group stored samples with DBSCAN
    Cluster(ClusterCommand),
    /// Summarise similarity and shared metadata across samples
    Patterns(PatternsCommand),
    /// Score a fingerprint for voice manipulation
    Manipulation(ManipulationCommand),
    /// Score a fingerprint against known fraudsters
    Fraud(FraudCommand),
    /// Show past fraud checks
    History(HistoryCommand),
    /// Show collection sizes
    Stats(StatsCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins unless -v asks for debug output.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run(&cli)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Add(cmd) => cmd.run(cli),
        Commands::Remove(cmd) => cmd.run(cli),
        Commands::Show(cmd) => cmd.run(cli),
        Commands::List(cmd) => cmd.run(cli),
        Commands::Fraudster(cmd) => cmd.run(cli),
        Commands::Match(cmd) => cmd.run(cli),
        Commands::Cluster(cmd) => cmd.run(cli),
        Commands::Patterns(cmd) => cmd.run(cli),
        Commands::Manipulation(cmd) => cmd.run(cli),
        Commands::Fraud(cmd) => cmd.run(cli),
        Commands::History(cmd) => cmd.run(cli),
        Commands::Stats(cmd) => cmd.run(cli),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoke(args: &[&str]) -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(args)?;
        run(&cli)
    }

    #[test]
    fn test_match_rejects_unknown_report_format() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.yaml");
        let db = dir.path().join("engine.db");
        let query = dir.path().join("query.json");
        let report = dir.path().join("report.xml");
        std::fs::write(&query, "[1.0, 0.0]").unwrap();

        let config = config.to_str().unwrap();
        let db = db.to_str().unwrap();
        let query = query.to_str().unwrap();
        let common = ["--config", config, "--db", db, "-f", query];

        let mut add = vec!["voxtrace", "add", "call-1"];
        add.extend(common);
        invoke(&add).unwrap();

        let mut matching = vec!["voxtrace", "match", "--format", "xml"];
        matching.extend(["--report", report.to_str().unwrap()]);
        matching.extend(common);
        let err = invoke(&matching).unwrap_err();
        assert!(err.to_string().contains("unsupported report format"));
        assert!(!report.exists());
    }

    #[test]
    fn test_match_writes_csv_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.yaml");
        let db = dir.path().join("engine.db");
        let query = dir.path().join("query.json");
        let report = dir.path().join("report.csv");
        std::fs::write(&query, "[1.0, 0.0]").unwrap();

        let config = config.to_str().unwrap();
        let db = db.to_str().unwrap();
        let query = query.to_str().unwrap();
        let common = ["--config", config, "--db", db, "-f", query];

        let mut add = vec!["voxtrace", "add", "call-1"];
        add.extend(common);
        invoke(&add).unwrap();

        let mut matching = vec!["voxtrace", "match", "--format", "csv"];
        matching.extend(["--report", report.to_str().unwrap()]);
        matching.extend(common);
        invoke(&matching).unwrap();

        let content = std::fs::read_to_string(&report).unwrap();
        assert!(content.starts_with("sample_id,similarity"));
        assert!(content.contains("call-1"));
    }
}
