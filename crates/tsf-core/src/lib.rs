//! Core domain logic for plain-text timesheets.
//!
//! This crate contains the fundamental types and logic for:
//! - Tokenizing and parsing timesheet lines into work items
//! - Converting between decimal and `XhYm` duration notations
//! - The timesheet model (days, weeks clipped to months, holidays)
//! - Projecting parsed lines into editor semantic tokens
//! - Aggregating persisted entries into dirty/committed statistics

pub mod duration;
pub mod error;
pub mod parser;
pub mod report;
pub mod repository;
pub mod rules;
pub mod semantic;
pub mod service;
pub mod statistics;
pub mod timesheet;
pub mod token;

pub use duration::WorkTime;
pub use error::{DateError, EntryViolation, LineError, ParseError, TimesheetError};
pub use parser::LineParser;
pub use repository::Repository;
pub use rules::{Classifier, Rules, RulesError};
pub use semantic::{SemanticType, TokenReady};
pub use service::{Processed, ReportError, TimesheetService, WriteMode};
pub use statistics::{
    CategoryStatistic, DailyStatistic, DayEntry, MonthlyStatistic, Statistic, StatisticRecord,
    WeeklyStatistic,
};
pub use timesheet::{Day, Holiday, Month, Timesheet, TimesheetEntry, Week, WorkItem};
