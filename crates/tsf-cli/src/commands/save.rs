//! Save command: parse a day file and store it.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tsf_core::{Classifier, Day, WriteMode};

use crate::Service;
use crate::commands::check::write_errors;

pub fn run<W: Write>(
    writer: &mut W,
    service: &mut Service,
    file: &Path,
    text: &str,
    day: Day,
    mode: WriteMode,
) -> Result<usize> {
    let processed = service
        .process(text, day, mode)
        .with_context(|| format!("failed to store timesheet for {day}"))?;

    let categories = service.classifier().possible_categories();
    let errors = write_errors(writer, file, &processed.errors, &categories)?;

    if processed.items.is_empty() {
        writeln!(writer, "Nothing to store for {day}")?;
    } else {
        writeln!(writer, "Stored {} items for {day} ({mode})", processed.items.len())?;
    }
    Ok(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tsf_core::{Rules, TimesheetService};
    use tsf_db::Database;

    fn service() -> Service {
        TimesheetService::new(
            Rules::with_categories(["aaa"]),
            Database::open_in_memory().unwrap(),
        )
    }

    #[test]
    fn save_then_draft_changes_only_dirty_totals() {
        let mut service = service();
        let day = Day::parse("2022-02-02").unwrap();
        let file = Path::new("2022/02/02.tsf");

        let mut output = Vec::new();
        run(&mut output, &mut service, file, "aaa 1.0 first\n", day, WriteMode::Save).unwrap();
        run(&mut output, &mut service, file, "aaa 2.0 first\n", day, WriteMode::Draft).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Stored 1 items for 2022-02-02 (save)\nStored 1 items for 2022-02-02 (draft)\n"
        );
        let daily = service.daily_statistics(day).unwrap();
        assert_eq!(daily[0].committed.normalized(), (1, 0));
        assert_eq!(daily[0].dirty.normalized(), (2, 0));
    }

    #[test]
    fn nothing_stored_when_every_line_fails() {
        let mut service = service();
        let day = Day::parse("2022-02-02").unwrap();

        let mut output = Vec::new();
        let errors = run(
            &mut output,
            &mut service,
            Path::new("d.tsf"),
            "zzz 1.0\n",
            day,
            WriteMode::Save,
        )
        .unwrap();

        assert_eq!(errors, 1);
        assert!(String::from_utf8(output).unwrap().ends_with("Nothing to store for 2022-02-02\n"));
        assert!(service.daily_statistics(day).unwrap().is_empty());
    }
}
