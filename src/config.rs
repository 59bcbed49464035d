//! CLI configuration

use std::num::NonZeroU64;
use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_TEST_RUNS: u64 = 100_000;
pub const DEFAULT_SCHEMA_PATH: &str = "schemas/user-registered.avsc";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("must be an unsigned integer, got {0:?}")]
    NotAnInteger(String),
    #[error("must be >= {min}, got {value}")]
    BelowMinimum { min: u64, value: u64 },
}

/// Validasi `--test-runs`: hanya digit, minimal 1
pub fn parse_test_runs(raw: &str) -> Result<NonZeroU64, ConfigError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::NotAnInteger(raw.to_string()));
    }
    let value: u64 = raw
        .parse()
        .map_err(|_| ConfigError::NotAnInteger(raw.to_string()))?;
    NonZeroU64::new(value).ok_or(ConfigError::BelowMinimum { min: 1, value })
}

#[derive(Parser, Debug, Clone)]
#[command(name = "serde_speed", about = "Avro serde round-trip speed benchmark")]
pub struct Args {
    /// Number of timed round trips per variant
    #[arg(
        long = "test-runs",
        default_value = "100000",
        value_parser = parse_test_runs,
        allow_hyphen_values = true
    )]
    pub test_runs: NonZeroU64,

    /// AVSC schema file path
    #[arg(long, default_value = DEFAULT_SCHEMA_PATH)]
    pub schema: PathBuf,

    /// Topic used for subject naming (`<topic>-value`)
    #[arg(long, env = "SERDE_SPEED_TOPIC", default_value = "input-topic")]
    pub topic: String,

    /// Print input/output events and per-iteration logs
    #[arg(long)]
    pub verbose: bool,

    /// Hand the collected results to the chart sink
    #[arg(long)]
    pub chart: bool,

    /// Where the chart sink writes its data
    #[arg(long, default_value = "outputs/serde_speed.json")]
    pub chart_output: PathBuf,
}
