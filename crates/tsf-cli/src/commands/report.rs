//! Report command: daily, weekly and monthly statistics.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tsf_core::Day;

use crate::Service;

/// Prints the report for `day`; with `write_to` also stores the report file.
pub fn run<W: Write>(writer: &mut W, service: &Service, day: Day, write_to: Option<&Path>) -> Result<()> {
    let text = service
        .report(day)
        .with_context(|| format!("failed to build report for {day}"))?;
    write!(writer, "{text}")?;

    if let Some(dir) = write_to {
        let path = service.write_report(day, dir)?;
        writeln!(writer)?;
        writeln!(writer, "Report written to {}", path.display())?;
    }
    Ok(())
}
