//! CLI utilities for voxtrace.
//!
//! This crate provides the configuration, path, input and output helpers
//! shared by voxtrace command line tools.

pub mod config;
pub mod input;
pub mod output;
pub mod paths;

pub use config::{load_config, Config};
pub use input::{load_fingerprint, parse_meta_pairs, FingerprintInput, InputError};
pub use output::{Output, OutputFormat};
pub use paths::Paths;
