// kinemorph_cli/src/cli.rs

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Kinemorph: turns recorded pose landmarks into bone rotations for a rigged model.
///
/// This struct defines the command-line arguments of the `kinemorph` binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "kinemorph", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Condition a landmark clip and solve every frame against a model.
    Solve(SolveArgs),

    /// Print which model node each canonical bone role resolves to.
    Bones {
        /// The `.glb` model to inspect.
        #[arg(short, long)]
        model: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    /// The `.glb` model whose skeleton the rotations are solved for.
    #[arg(short, long)]
    pub model: PathBuf,

    /// The landmark clip, as JSON.
    #[arg(short, long)]
    pub clip: PathBuf,

    /// A TOML file with pipeline settings.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Moving-average window in frames; overrides the configuration.
    #[arg(short, long)]
    pub window: Option<usize>,

    /// Where to write the rotations. Printed to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_solve_with_overrides() {
        let cli = Cli::try_parse_from([
            "kinemorph", "solve", "--model", "avatar.glb", "--clip", "wave.json", "--window", "5",
        ])
        .unwrap();
        let Command::Solve(args) = cli.command else {
            panic!("expected the solve command");
        };
        assert_eq!(args.model, PathBuf::from("avatar.glb"));
        assert_eq!(args.window, Some(5));
        assert_eq!(args.config, None);
        assert_eq!(args.output, None);
    }

    #[test]
    fn bones_requires_a_model() {
        assert!(Cli::try_parse_from(["kinemorph", "bones"]).is_err());
        assert!(Cli::try_parse_from(["kinemorph", "bones", "-m", "avatar.glb"]).is_ok());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
