//! tsf CLI library.
//!
//! This crate provides the command-line interface and the language server
//! for plain-text timesheets.

mod cli;
pub mod commands;
mod config;
pub mod diagnostics;
pub mod lsp;
pub mod util;

pub use cli::{Cli, Commands};
pub use config::{Config, DebounceConfig, DebounceScope};

use tsf_core::{Rules, TimesheetService};
use tsf_db::Database;

/// The service as wired by the binary: configured rules over SQLite.
pub type Service = TimesheetService<Rules, Database>;
