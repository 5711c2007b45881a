//! Batch processing of a day's text and statistics queries.
//!
//! [`TimesheetService`] ties the parser to a [`Repository`]: it turns the
//! full text of a day file into work items and line errors, persists the
//! result as a draft or a save, and renders statistics back as text.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::{LineError, ParseError};
use crate::parser::LineParser;
use crate::report;
use crate::repository::Repository;
use crate::rules::Classifier;
use crate::semantic::{self, TokenReady};
use crate::statistics::{self, DailyStatistic, DayEntry, MonthlyStatistic, WeeklyStatistic};
use crate::timesheet::{Day, Timesheet, WorkItem};

/// How processed text is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace only the pending rows.
    Draft,
    /// Replace committed and pending rows.
    Save,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Save => write!(f, "save"),
        }
    }
}

/// Outcome of processing a day's text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Processed {
    pub items: Vec<WorkItem>,
    pub errors: Vec<LineError>,
}

/// Failure to produce the report file.
#[derive(Debug, Error)]
pub enum ReportError<E>
where
    E: std::error::Error + 'static,
{
    #[error("failed to query statistics")]
    Repository(#[source] E),
    #[error("failed to write report {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Parses and validates every line of `text` without persisting anything.
///
/// A trailing empty line is ignored; other blank lines are reported as
/// [`ParseError::EmptyLine`].
pub fn analyze<C>(classifier: &C, text: &str, day: Day) -> Processed
where
    C: Classifier + ?Sized,
{
    let mut processed = Processed::default();
    let parser = LineParser::new(classifier, day);

    let lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    for (line_number, line) in lines.iter().enumerate() {
        if line_number == last && line.is_empty() {
            continue;
        }
        let checked = parser.parse_line(line).and_then(|item| {
            if let WorkItem::Entry(entry) = &item {
                entry.validate()?;
            }
            Ok(item)
        });
        match checked {
            Ok(item) => processed.items.push(item),
            Err(error) => processed.errors.push(LineError {
                line_number,
                line_length: line.len(),
                error,
            }),
        }
    }
    processed
}

/// Parses, persists and reports timesheets.
pub struct TimesheetService<C, R> {
    classifier: C,
    repository: R,
}

impl<C, R> TimesheetService<C, R>
where
    C: Classifier,
    R: Repository,
{
    pub const fn new(classifier: C, repository: R) -> Self {
        Self {
            classifier,
            repository,
        }
    }

    pub const fn classifier(&self) -> &C {
        &self.classifier
    }

    pub const fn repository(&self) -> &R {
        &self.repository
    }

    pub fn parser(&self, day: Day) -> LineParser<'_, C> {
        LineParser::new(&self.classifier, day)
    }

    pub fn process_for_save(&mut self, text: &str, day: Day) -> Result<Processed, R::Error> {
        self.process(text, day, WriteMode::Save)
    }

    pub fn process_for_draft(&mut self, text: &str, day: Day) -> Result<Processed, R::Error> {
        self.process(text, day, WriteMode::Draft)
    }

    /// Parses every line of `text` and persists the valid items.
    ///
    /// Nothing is written when no line produced an item.
    pub fn process(&mut self, text: &str, day: Day, mode: WriteMode) -> Result<Processed, R::Error> {
        let mut processed = analyze(&self.classifier, text, day);

        tracing::debug!(
            %day,
            %mode,
            items = processed.items.len(),
            errors = processed.errors.len(),
            "processed timesheet"
        );

        if processed.items.is_empty() {
            return Ok(processed);
        }

        let mut timesheet = Timesheet::new(day);
        for item in &processed.items {
            if let Err(err) = timesheet.add(item.clone()) {
                processed.errors.push(LineError {
                    line_number: 0,
                    line_length: 0,
                    error: ParseError::from(err),
                });
            }
        }

        match mode {
            WriteMode::Draft => self.repository.pending_save(&timesheet)?,
            WriteMode::Save => self.repository.save(&timesheet)?,
        }
        tracing::info!(%day, %mode, entries = timesheet.entries().len(), "timesheet persisted");

        Ok(processed)
    }

    /// Parses and validates a single line, discarding the reason on failure.
    pub fn parse_line(&self, line: &str, day: Day) -> Option<WorkItem> {
        let item = self.parser(day).parse_line(line).ok()?;
        match &item {
            WorkItem::Entry(entry) if entry.validate().is_err() => None,
            _ => Some(item),
        }
    }

    pub fn semantic_tokens<S: AsRef<str>>(&self, lines: &[S], day: Day) -> Vec<TokenReady> {
        semantic::project(&self.parser(day), lines)
    }

    pub fn possible_categories(&self) -> Vec<String> {
        self.classifier.possible_categories()
    }

    pub fn is_category(&self, text: &str) -> bool {
        self.classifier.is_category(text)
    }

    pub fn daily_statistics(&self, day: Day) -> Result<Vec<DailyStatistic>, R::Error> {
        let records = self.repository.daily(day)?;
        Ok(statistics::aggregate(records, |c| self.classifier.is_overtime(c)))
    }

    pub fn weekly_statistics(&self, day: Day) -> Result<Vec<WeeklyStatistic>, R::Error> {
        let records = self.repository.weekly(day.week())?;
        Ok(statistics::aggregate(records, |c| self.classifier.is_overtime(c)))
    }

    pub fn monthly_statistics(&self, day: Day) -> Result<Vec<MonthlyStatistic>, R::Error> {
        let records = self.repository.monthly(day.month())?;
        Ok(statistics::aggregate(records, |c| self.classifier.is_overtime(c)))
    }

    pub fn day_entries(&self, day: Day) -> Result<Vec<DayEntry>, R::Error> {
        self.repository.day_entries(day)
    }

    /// Hover summary of the day's dirty totals.
    pub fn hover(&self, day: Day) -> Result<String, R::Error> {
        Ok(report::render_hover(day, &self.daily_statistics(day)?))
    }

    /// Full report text for `day`.
    pub fn report(&self, day: Day) -> Result<String, R::Error> {
        let entries = self.day_entries(day)?;
        let weekly = self.weekly_statistics(day)?;
        let monthly = self.monthly_statistics(day)?;
        Ok(report::render_report(day, &entries, &weekly, &monthly))
    }

    /// Writes the report into `dir`, replacing a previous one.
    pub fn write_report(&self, day: Day, dir: &Path) -> Result<PathBuf, ReportError<R::Error>> {
        let text = self.report(day).map_err(ReportError::Repository)?;
        let path = dir.join(report::report_file_name(day));
        fs::create_dir_all(dir)
            .and_then(|()| fs::write(&path, text))
            .map_err(|source| ReportError::Io {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), "report written");
        Ok(path)
    }
}
