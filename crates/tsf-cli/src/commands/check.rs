//! Check command: report unparseable lines without storing anything.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tsf_core::service::analyze;
use tsf_core::{Classifier, Day, LineError, Rules};

use crate::diagnostics;

pub fn run<W: Write>(writer: &mut W, rules: &Rules, file: &Path, text: &str, day: Day) -> Result<usize> {
    let processed = analyze(rules, text, day);
    let errors = write_errors(writer, file, &processed.errors, &rules.possible_categories())?;
    writeln!(
        writer,
        "{day}: {} items, {errors} errors",
        processed.items.len()
    )?;
    Ok(errors)
}

/// Prints `file:line: message` for every error worth reporting.
pub(crate) fn write_errors<W: Write>(
    writer: &mut W,
    file: &Path,
    errors: &[LineError],
    categories: &[String],
) -> Result<usize> {
    let mut reported = 0;
    for error in errors {
        let Some(message) = diagnostics::message(&error.error, categories) else {
            continue;
        };
        writeln!(writer, "{}:{}: {message}", file.display(), error.line_number + 1)?;
        reported += 1;
    }
    Ok(reported)
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    #[test]
    fn check_reports_bad_lines_and_skips_blank_ones() {
        let rules = Rules::with_categories(["aaa", "bbb"]);
        let text = "aaa 1.0 first\nzzz 1.0 nope\n\naaa 1.753 x\n";
        let day = Day::parse("2022-02-02").unwrap();

        let mut output = Vec::new();
        let errors = run(&mut output, &rules, Path::new("2022/02/02.tsf"), text, day).unwrap();

        assert_eq!(errors, 2);
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
2022/02/02.tsf:2: Invalid category. Possible categories: aaa, bbb
2022/02/02.tsf:4: Invalid time format. Use X.Y or XhYm (e.g., 1.5 or 1h30m)
2022-02-02: 1 items, 2 errors
");
    }

    #[test]
    fn clean_file_has_no_errors() {
        let rules = Rules::with_categories(["aaa", "bbb", "ccc"]);
        let text = "aaa 1.0 first\nbbb 2.0 description\nccc 1.5 some other\naaa 1h30m second\naaa 1h45m third\n";
        let day = Day::parse("2022-02-02").unwrap();

        let mut output = Vec::new();
        let errors = run(&mut output, &rules, Path::new("x.tsf"), text, day).unwrap();

        assert_eq!(errors, 0);
        assert_eq!(String::from_utf8(output).unwrap(), "2022-02-02: 5 items, 0 errors\n");
    }
}
