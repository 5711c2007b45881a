//! CLI subcommand implementations.

pub mod categories;
pub mod check;
pub mod report;
pub mod save;
pub mod serve;
pub mod tokens;
