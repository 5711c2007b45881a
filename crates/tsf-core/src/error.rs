//! Error taxonomy for line parsing and the timesheet model.
//!
//! Every error here is recoverable and reported per line: a batch of lines
//! yields valid work items alongside a list of [`LineError`]s.

use thiserror::Error;

use crate::timesheet::Day;

/// A date string that is not a valid `YYYY-MM-DD` calendar date.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid date {date:?}: {source}")]
pub struct DateError {
    pub date: String,
    #[source]
    pub source: chrono::ParseError,
}

/// Invariant violations of a single timesheet entry.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EntryViolation {
    #[error("hours cannot be more than 23, got {0}")]
    HoursOutOfRange(u8),
    #[error("minutes cannot be more than 59, got {0}")]
    MinutesOutOfRange(u8),
    #[error("hours and minutes cannot be both 0")]
    ZeroDuration,
}

/// Errors raised when adding work items to a [`Timesheet`](crate::Timesheet).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimesheetError {
    #[error("invalid entry: {0}")]
    InvalidEntry(#[from] EntryViolation),
    #[error("holiday date {holiday} does not match timesheet date {timesheet}")]
    HolidayDateMismatch { holiday: Day, timesheet: Day },
}

/// Why a single line could not become a work item.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Blank after trimming. Callers usually filter these silently.
    #[error("empty line")]
    EmptyLine,

    /// The leading token run is not a configured category.
    #[error("invalid category")]
    InvalidCategory,

    /// The duration matches neither notation, or breaks the 24h/60m bounds.
    #[error("invalid time format. Use X.Y or XhYm (e.g., 1.5 or 1h30m)")]
    InvalidTime,

    /// The entry parsed but violates its own invariants.
    #[error("invalid entry: {0}")]
    InvalidTimesheetEntry(#[from] EntryViolation),

    #[error(transparent)]
    InvalidDate(#[from] DateError),

    /// The timesheet refused the item (e.g. a holiday for another day).
    #[error("rejected by timesheet: {0}")]
    Rejected(TimesheetError),
}

impl From<TimesheetError> for ParseError {
    fn from(err: TimesheetError) -> Self {
        match err {
            TimesheetError::InvalidEntry(violation) => Self::InvalidTimesheetEntry(violation),
            other @ TimesheetError::HolidayDateMismatch { .. } => Self::Rejected(other),
        }
    }
}

/// A parse failure attached to its position in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// Zero-based line index.
    pub line_number: usize,
    /// Byte length of the offending line.
    pub line_length: usize,
    pub error: ParseError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timesheet_entry_violation_maps_to_invalid_entry() {
        let err: ParseError = TimesheetError::InvalidEntry(EntryViolation::ZeroDuration).into();
        assert_eq!(
            err,
            ParseError::InvalidTimesheetEntry(EntryViolation::ZeroDuration)
        );
    }

    #[test]
    fn invalid_time_message_names_both_notations() {
        assert_eq!(
            ParseError::InvalidTime.to_string(),
            "invalid time format. Use X.Y or XhYm (e.g., 1.5 or 1h30m)"
        );
    }
}
