//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::domain::{EscapePlacement, Strategy};

/// Search a dungeon for its escape room with depth-first and breadth-first search
#[derive(Parser, Debug)]
#[command(name = "dungeon")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every search command.
#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// Value of the escape room
    #[arg(short, long, allow_hyphen_values = true)]
    pub escape: Option<i64>,

    /// Strategy for a single search
    #[arg(short, long, value_enum, conflicts_with = "race")]
    pub strategy: Option<Strategy>,

    /// Race DFS against BFS concurrently
    #[arg(short, long)]
    pub race: bool,

    /// Print the dungeon before searching
    #[arg(short = 't', long)]
    pub show_tree: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a random dungeon and search it
    Random {
        /// Number of rooms
        #[arg(short, long)]
        nodes: Option<usize>,
        /// RNG seed for a reproducible dungeon
        #[arg(long)]
        seed: Option<u64>,
        /// Escape room placement
        #[arg(short, long, value_enum)]
        placement: Option<EscapePlacement>,
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Load a dungeon from a description file and search it
    File {
        /// One "<parent> <child>..." line per room
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Search using the configured mode
    Run {
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create local config template (./.dungeon.toml)
    Init {
        /// Create global config instead
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_random_args_when_parsing_then_fills_fields() {
        let cli = Cli::try_parse_from([
            "dungeon", "-dd", "random", "--nodes", "50", "--seed", "9", "--race", "-e", "-3",
        ])
        .unwrap();
        assert_eq!(cli.debug, 2);
        match cli.command {
            Some(Commands::Random {
                nodes, seed, search, ..
            }) => {
                assert_eq!(nodes, Some(50));
                assert_eq!(seed, Some(9));
                assert!(search.race);
                assert_eq!(search.escape, Some(-3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_race_and_strategy_when_parsing_then_conflict() {
        let result = Cli::try_parse_from(["dungeon", "run", "--race", "--strategy", "bfs"]);
        assert!(result.is_err());
    }
}
