//! Timesheet domain model.
//!
//! A [`Timesheet`] owns the [`WorkItem`]s recorded for one [`Day`]. Week and
//! month windows are derived from the day; a [`Week`] never spans two months.

use std::fmt;

use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{DateError, EntryViolation, TimesheetError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Hours assumed for a regular working day.
const REGULAR_WORKING_HOURS: u8 = 8;

/// A calendar date, formatted as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Day(NaiveDate);

impl Day {
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parses a strict `YYYY-MM-DD` string.
    pub fn parse(value: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Self)
            .map_err(|source| DateError {
                date: value.to_string(),
                source,
            })
    }

    pub const fn date(self) -> NaiveDate {
        self.0
    }

    pub fn weekday(self) -> Weekday {
        self.0.weekday()
    }

    pub fn day_of_month(self) -> u32 {
        self.0.day()
    }

    /// Integer storage key in the form `YYYYMMDD`.
    pub fn as_key(self) -> i64 {
        i64::from(self.0.year()) * 10_000 + i64::from(self.0.month()) * 100 + i64::from(self.0.day())
    }

    /// The Monday–Sunday span containing this day, clipped to its month.
    pub fn week(self) -> Week {
        let mut begin = self.0;
        while begin.weekday() != Weekday::Mon && begin.day() != 1 {
            let Some(previous) = begin.pred_opt() else {
                break;
            };
            begin = previous;
        }

        let mut end = self.0;
        while end.weekday() != Weekday::Sun && !is_last_day_of_month(end) {
            let Some(next) = end.succ_opt() else {
                break;
            };
            end = next;
        }

        Week {
            begin: Self(begin),
            end: Self(end),
        }
    }

    /// First and last calendar day of this day's month.
    pub fn month(self) -> Month {
        let first = self.0.with_day(1).unwrap_or(self.0);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next_month| next_month.pred_opt())
            .unwrap_or(first);
        Month {
            begin: Self(first),
            end: Self(last),
        }
    }
}

fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt().is_none_or(|next| next.day() == 1)
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl From<NaiveDate> for Day {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl TryFrom<String> for Day {
    type Error = DateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Day> for String {
    fn from(day: Day) -> Self {
        day.to_string()
    }
}

impl std::str::FromStr for Day {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Monday–Sunday window, truncated at month boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Week {
    pub begin: Day,
    pub end: Day,
}

/// First to last day of a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Month {
    pub begin: Day,
    pub end: Day,
}

/// A non-working day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holiday {
    pub date: Day,
    pub description: String,
}

impl Holiday {
    /// Creates a holiday from a `YYYY-MM-DD` date string.
    pub fn new(date: &str, description: impl Into<String>) -> Result<Self, DateError> {
        Ok(Self {
            date: Day::parse(date)?,
            description: description.into(),
        })
    }
}

/// One line of recorded work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimesheetEntry {
    pub hours: u8,
    pub minutes: u8,
    pub comment: String,
    pub task: Option<String>,
    pub category: String,
}

impl TimesheetEntry {
    /// Checks the entry invariants: hours < 24, minutes < 60, not both zero.
    pub const fn validate(&self) -> Result<(), EntryViolation> {
        if self.hours >= 24 {
            return Err(EntryViolation::HoursOutOfRange(self.hours));
        }
        if self.minutes >= 60 {
            return Err(EntryViolation::MinutesOutOfRange(self.minutes));
        }
        if self.hours == 0 && self.minutes == 0 {
            return Err(EntryViolation::ZeroDuration);
        }
        Ok(())
    }

    /// Task reference, or an empty string when none was given.
    pub fn task_name(&self) -> &str {
        self.task.as_deref().unwrap_or_default()
    }
}

/// What a single timesheet line describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    Holiday(Holiday),
    Entry(TimesheetEntry),
}

impl WorkItem {
    pub const fn is_holiday(&self) -> bool {
        matches!(self, Self::Holiday(_))
    }

    pub const fn as_entry(&self) -> Option<&TimesheetEntry> {
        match self {
            Self::Entry(entry) => Some(entry),
            Self::Holiday(_) => None,
        }
    }
}

/// All work items recorded for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timesheet {
    date: Day,
    entries: Vec<WorkItem>,
}

impl Timesheet {
    pub const fn new(date: Day) -> Self {
        Self {
            date,
            entries: Vec::new(),
        }
    }

    /// Creates an empty timesheet from a `YYYY-MM-DD` date string.
    pub fn for_date(date: &str) -> Result<Self, DateError> {
        Ok(Self::new(Day::parse(date)?))
    }

    pub const fn date(&self) -> Day {
        self.date
    }

    pub fn entries(&self) -> &[WorkItem] {
        &self.entries
    }

    /// Validates and appends an entry. The timesheet is untouched on error.
    pub fn add_entry(&mut self, entry: TimesheetEntry) -> Result<(), TimesheetError> {
        entry.validate()?;
        self.entries.push(WorkItem::Entry(entry));
        Ok(())
    }

    /// Appends a holiday recorded for this timesheet's date.
    pub fn add_holiday(&mut self, holiday: Holiday) -> Result<(), TimesheetError> {
        if holiday.date != self.date {
            return Err(TimesheetError::HolidayDateMismatch {
                holiday: holiday.date,
                timesheet: self.date,
            });
        }
        self.entries.push(WorkItem::Holiday(holiday));
        Ok(())
    }

    /// Adds either kind of work item.
    pub fn add(&mut self, item: WorkItem) -> Result<(), TimesheetError> {
        match item {
            WorkItem::Holiday(holiday) => self.add_holiday(holiday),
            WorkItem::Entry(entry) => self.add_entry(entry),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn week(&self) -> Week {
        self.date.week()
    }

    pub fn month(&self) -> Month {
        self.date.month()
    }

    /// Hours a regular day is expected to hold.
    pub const fn potential_total_time(&self) -> u8 {
        REGULAR_WORKING_HOURS
    }

    /// Expected working hours: zero on a holiday.
    pub fn potential_working_time(&self) -> u8 {
        if self.entries.iter().any(WorkItem::is_holiday) {
            0
        } else {
            REGULAR_WORKING_HOURS
        }
    }

    /// Sum of `hours + minutes / 60` over the non-holiday entries.
    pub fn working_time(&self) -> f32 {
        self.entries
            .iter()
            .filter_map(WorkItem::as_entry)
            .map(|entry| f32::from(entry.hours) + f32::from(entry.minutes) / 60.0)
            .sum()
    }
}
