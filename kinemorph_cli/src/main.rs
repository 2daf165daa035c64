// kinemorph_cli/src/main.rs

use anyhow::Result;
use clap::Parser;
use kinemorph_cli::cli::{Cli, Command};
use kinemorph_cli::commands::{run_bones, run_solve};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for JSON output.
    // `RUST_LOG` overrides the default filter, e.g. `RUST_LOG=kinemorph_core=debug`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Solve(args) => run_solve(args),
        Command::Bones { model } => run_bones(model),
    }
}
