//! Command-line interface definition.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "inertial-syncer",
    version,
    about = "Multi-channel inertial measurement synchronizer"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the syncer over simulated collectors
    Run(RunArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Configuration file (TOML/JSON); defaults to the accelerometer +
    /// gravity + gyroscope trio
    #[arg(short, long, env = "SYNCER_CONFIG")]
    pub config: Option<PathBuf>,

    /// How long to run, in seconds
    #[arg(short, long, default_value_t = 5.0)]
    pub duration_secs: f64,

    /// Log format: json | pretty | compact
    #[arg(long, default_value = "pretty")]
    pub log_format: String,

    /// Prometheus exporter port (omit to disable)
    #[arg(long)]
    pub metrics_port: Option<u16>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Configuration file to check
    pub config: PathBuf,
}
