//! inertial-syncer binary entry point.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();
    match cli.command {
        cli::Command::Run(args) => commands::run(args),
        cli::Command::Validate(args) => commands::validate(args),
    }
}
