//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Plain-text timesheets.
///
/// Parses day files written as `category duration [task] comment` lines,
/// stores them and reports daily, weekly and monthly totals. `tsf serve`
/// exposes the same features to editors over the language server protocol.
#[derive(Debug, Parser)]
#[command(name = "tsf", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report the lines of a day file that do not parse.
    Check {
        /// Day file, usually `<root>/YYYY/MM/DD.tsf`.
        file: PathBuf,

        /// Date of the file (YYYY-MM-DD); taken from the path when omitted.
        #[arg(long)]
        date: Option<String>,
    },

    /// Parse a day file and store its entries.
    Save {
        file: PathBuf,

        #[arg(long)]
        date: Option<String>,

        /// Store as a draft: only pending totals change.
        #[arg(long)]
        draft: bool,
    },

    /// Print daily, weekly and monthly statistics.
    Report {
        /// Day to report on (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Also write the report file and print its path.
        #[arg(long)]
        write: bool,
    },

    /// Print the semantic tokens of a day file.
    Tokens {
        file: PathBuf,

        #[arg(long)]
        date: Option<String>,

        /// Print the delta-encoded stream as JSON.
        #[arg(long)]
        encoded: bool,
    },

    /// List configured categories.
    Categories,

    /// Run the language server on stdin/stdout.
    Serve,
}
