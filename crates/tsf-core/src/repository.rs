//! Persistence seam for timesheets.

use crate::statistics::{DayEntry, StatisticRecord};
use crate::timesheet::{Day, Month, Timesheet, Week};

/// Storage for timesheets and the records statistics are built from.
///
/// Every stored entry exists in two copies: a committed one written by
/// [`save`](Repository::save) and a pending one written by both
/// [`save`](Repository::save) and [`pending_save`](Repository::pending_save).
/// Queries return both kinds; holidays are never returned.
pub trait Repository {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Replaces everything stored for the timesheet's date with its entries,
    /// committed and pending.
    fn save(&mut self, timesheet: &Timesheet) -> Result<(), Self::Error>;

    /// Replaces only the pending rows for the timesheet's date.
    fn pending_save(&mut self, timesheet: &Timesheet) -> Result<(), Self::Error>;

    fn daily(&self, day: Day) -> Result<Vec<StatisticRecord>, Self::Error>;

    fn weekly(&self, week: Week) -> Result<Vec<StatisticRecord>, Self::Error>;

    fn monthly(&self, month: Month) -> Result<Vec<StatisticRecord>, Self::Error>;

    /// Per-entry rows for `day`, in insertion order.
    fn day_entries(&self, day: Day) -> Result<Vec<DayEntry>, Self::Error>;
}
