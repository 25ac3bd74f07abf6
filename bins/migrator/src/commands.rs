use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line of the `migrator` binary.
#[derive(Parser)]
#[command(name = "migrator", version, about = "Hallmark schema migrations")]
pub struct Cli {
    /// Settings file; `migrator.toml` in the working directory when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Migrator subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Apply pending revisions
    Up {
        #[arg(long, help = "Print the SQL script to stdout instead of touching the database")]
        sql: bool,

        #[arg(long, requires = "sql", help = "Start the script after this revision")]
        from: Option<String>,
    },
    /// Revert applied revisions, newest first
    Down {
        #[arg(short = 'n', long, default_value_t = 1, help = "Number of revisions to revert")]
        steps: u32,
    },
    /// Show applied and pending revisions
    Status,
}
