//! CLI commands module.

mod analysis;
mod fraudster;
mod info;
mod matching;
mod risk;
mod samples;
mod util;

pub use analysis::{ClusterCommand, PatternsCommand};
pub use fraudster::FraudsterCommand;
pub use info::{HistoryCommand, StatsCommand};
pub use matching::MatchCommand;
pub use risk::{FraudCommand, ManipulationCommand};
pub use samples::{AddCommand, ListCommand, RemoveCommand, ShowCommand};

// Re-export utils for use in commands
pub(crate) use util::*;
