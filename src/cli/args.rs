use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "poll-watch",
    about = "Poll a command and report when its output changes"
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    Watch {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        wait_time_ms: Option<u64>,
        /// Exit after this many changes have been printed.
        #[arg(long)]
        max_changes: Option<usize>,
    },
    Once {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum ConfigCommands {
    Path {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
