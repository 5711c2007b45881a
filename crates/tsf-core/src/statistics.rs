//! Dirty and committed statistics per category.
//!
//! The repository returns one [`StatisticRecord`] per stored entry; pending
//! rows reflect the document as currently typed, committed rows reflect the
//! last explicit save. [`aggregate`] folds them into one
//! [`CategoryStatistic`] per category, sorted by category name.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::duration;

/// One persisted entry as seen by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticRecord {
    pub category: String,
    pub hours: u32,
    pub minutes: u32,
    pub pending: bool,
}

/// Per-entry row used by the report breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayEntry {
    pub category: String,
    pub hours: u32,
    pub minutes: u32,
    pub comment: String,
    pub task: Option<String>,
    pub pending: bool,
}

impl DayEntry {
    /// `task comment`, or just the comment when there is no task.
    pub fn description(&self) -> String {
        match &self.task {
            Some(task) if self.comment.is_empty() => task.clone(),
            Some(task) => format!("{task} {}", self.comment),
            None => self.comment.clone(),
        }
    }
}

/// Summed time of one category. Hours and minutes are summed separately;
/// minutes may exceed 59 until [`Statistic::normalized`] is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistic {
    pub category: String,
    pub hours: u32,
    pub minutes: u32,
    pub overtime: bool,
}

impl Statistic {
    pub fn empty(category: impl Into<String>, overtime: bool) -> Self {
        Self {
            category: category.into(),
            hours: 0,
            minutes: 0,
            overtime,
        }
    }

    fn add(&mut self, hours: u32, minutes: u32) {
        self.hours = self.hours.saturating_add(hours);
        self.minutes = self.minutes.saturating_add(minutes);
    }

    pub const fn total_minutes(&self) -> u32 {
        self.hours.saturating_mul(60).saturating_add(self.minutes)
    }

    /// `(hours, minutes)` with minutes carried into hours.
    pub const fn normalized(&self) -> (u32, u32) {
        let total = self.total_minutes();
        (total / 60, total % 60)
    }

    /// `H:MM`.
    pub fn clock(&self) -> String {
        let (hours, minutes) = self.normalized();
        format!("{hours}:{minutes:02}")
    }

    /// `HH:MM`.
    pub fn padded_clock(&self) -> String {
        let (hours, minutes) = self.normalized();
        format!("{hours:02}:{minutes:02}")
    }

    /// `H.F` via the reverse duration codec.
    pub fn decimal(&self) -> String {
        let (hours, minutes) = self.normalized();
        duration::format_decimal(hours, minutes)
    }
}

/// Dirty (pending) and committed totals of one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStatistic {
    pub category: String,
    pub dirty: Statistic,
    pub committed: Statistic,
}

pub type DailyStatistic = CategoryStatistic;
pub type WeeklyStatistic = CategoryStatistic;
pub type MonthlyStatistic = CategoryStatistic;

/// Groups records by category.
///
/// `is_overtime` tags each category. Categories appear once, in sorted order,
/// even when only one of the two totals is non-zero.
pub fn aggregate<I, F>(records: I, is_overtime: F) -> Vec<CategoryStatistic>
where
    I: IntoIterator<Item = StatisticRecord>,
    F: Fn(&str) -> bool,
{
    let mut grouped: BTreeMap<String, CategoryStatistic> = BTreeMap::new();
    for record in records {
        let stat = grouped.entry(record.category.clone()).or_insert_with(|| {
            let overtime = is_overtime(&record.category);
            CategoryStatistic {
                category: record.category.clone(),
                dirty: Statistic::empty(record.category.as_str(), overtime),
                committed: Statistic::empty(record.category.as_str(), overtime),
            }
        });
        if record.pending {
            stat.dirty.add(record.hours, record.minutes);
        } else {
            stat.committed.add(record.hours, record.minutes);
        }
    }
    grouped.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: &str, hours: u32, minutes: u32, pending: bool) -> StatisticRecord {
        StatisticRecord {
            category: category.to_string(),
            hours,
            minutes,
            pending,
        }
    }

    #[test]
    fn aggregate_splits_pending_and_committed() {
        let stats = aggregate(
            vec![
                record("bbb", 1, 0, true),
                record("aaa", 1, 30, true),
                record("aaa", 1, 45, true),
                record("aaa", 2, 0, false),
            ],
            |_| false,
        );

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].category, "aaa");
        assert_eq!((stats[0].dirty.hours, stats[0].dirty.minutes), (2, 75));
        assert_eq!((stats[0].committed.hours, stats[0].committed.minutes), (2, 0));
        assert_eq!(stats[1].category, "bbb");
        assert_eq!(stats[1].committed.total_minutes(), 0);
    }

    #[test]
    fn aggregate_tags_overtime() {
        let stats = aggregate(
            vec![record("night", 2, 0, false), record("day", 1, 0, false)],
            |category| category == "night",
        );
        assert!(!stats[0].committed.overtime);
        assert!(stats[1].committed.overtime);
        assert!(stats[1].dirty.overtime);
    }

    #[test]
    fn aggregate_empty_input() {
        assert!(aggregate(Vec::new(), |_| false).is_empty());
    }

    #[test]
    fn month_totals_exceed_a_byte() {
        let records = (0..20).map(|_| record("aaa", 23, 59, false));
        let stats = aggregate(records, |_| false);
        assert_eq!(stats[0].committed.hours, 460);
        assert_eq!(stats[0].committed.normalized(), (479, 40));
    }

    #[test]
    fn renderings_normalize_minutes() {
        let stat = Statistic {
            category: "aaa".to_string(),
            hours: 2,
            minutes: 135,
            overtime: false,
        };
        assert_eq!(stat.clock(), "4:15");
        assert_eq!(stat.padded_clock(), "04:15");
        assert_eq!(stat.decimal(), "4.25");
    }

    #[test]
    fn description_prefixes_task() {
        let mut entry = DayEntry {
            category: "aaa".to_string(),
            hours: 1,
            minutes: 0,
            comment: "first".to_string(),
            task: Some("Task-1".to_string()),
            pending: true,
        };
        assert_eq!(entry.description(), "Task-1 first");
        entry.comment.clear();
        assert_eq!(entry.description(), "Task-1");
        entry.task = None;
        assert_eq!(entry.description(), "");
    }
}
