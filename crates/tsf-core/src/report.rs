//! Text rendering of statistics: the report file and the hover summary.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use crate::duration;
use crate::statistics::{CategoryStatistic, DailyStatistic, DayEntry, MonthlyStatistic, WeeklyStatistic};
use crate::timesheet::Day;

/// File name of the report for `day`.
pub fn report_file_name(day: Day) -> String {
    format!("report-timesheet-{day}.txt")
}

/// Renders the report file body.
pub fn render_report(
    day: Day,
    entries: &[DayEntry],
    weekly: &[WeeklyStatistic],
    monthly: &[MonthlyStatistic],
) -> String {
    Report {
        day,
        entries,
        weekly,
        monthly,
    }
    .to_string()
}

/// The report for one day.
///
/// The daily section lists pending entries grouped by category with `H:MM`
/// totals; a category that only has committed rows still gets a `0:00`
/// header. Weekly and monthly sections show committed totals in decimal
/// hours.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub day: Day,
    pub entries: &'a [DayEntry],
    pub weekly: &'a [WeeklyStatistic],
    pub monthly: &'a [MonthlyStatistic],
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "For {}", self.day)?;

        write_day(out, self.entries)?;
        writeln!(out)?;

        writeln!(out, "Weekly statistics")?;
        write_committed(out, self.weekly)?;
        writeln!(out)?;

        writeln!(out, "Monthly statistics")?;
        write_committed(out, self.monthly)
    }
}

fn write_day<W: Write>(out: &mut W, entries: &[DayEntry]) -> fmt::Result {
    writeln!(out, "Daily statistics")?;

    let mut by_category: BTreeMap<&str, Vec<&DayEntry>> = BTreeMap::new();
    for entry in entries {
        let bucket = by_category.entry(entry.category.as_str()).or_default();
        if entry.pending {
            bucket.push(entry);
        }
    }

    for (category, bucket) in by_category {
        let total: u32 = bucket
            .iter()
            .map(|e| e.hours.saturating_mul(60).saturating_add(e.minutes))
            .sum();
        writeln!(out, "{category} {}:{:02}", total / 60, total % 60)?;
        for entry in bucket {
            let description = entry.description();
            let time = duration::format_decimal(entry.hours, entry.minutes);
            if description.is_empty() {
                writeln!(out, "{time}")?;
            } else {
                writeln!(out, "{time} {description}")?;
            }
        }
    }
    Ok(())
}

fn write_committed<W: Write>(out: &mut W, stats: &[CategoryStatistic]) -> fmt::Result {
    for stat in sorted(stats) {
        writeln!(out, "{} {}", stat.category, stat.committed.decimal())?;
    }
    Ok(())
}

/// Renders the hover summary from dirty totals.
pub fn render_hover(day: Day, daily: &[DailyStatistic]) -> String {
    let mut out = format!("Daily statistics for {day}\n");
    for stat in sorted(daily) {
        out.push_str(&format!("{}: {}\n", stat.category, stat.dirty.padded_clock()));
    }
    out.push_str("End");
    out
}

fn sorted(stats: &[CategoryStatistic]) -> Vec<&CategoryStatistic> {
    let mut refs: Vec<&CategoryStatistic> = stats.iter().collect();
    refs.sort_by(|a, b| a.category.cmp(&b.category));
    refs
}
