use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use tracing::trace;

use crate::month::{MonthWindow, add_days, weekday_offset};

pub const DAYS_PER_WEEK: usize = 7;

/// One full row of the month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRow {
    pub week_index: usize,
    pub days: [NaiveDate; DAYS_PER_WEEK],
}

impl WeekRow {
    pub fn first_day(&self) -> NaiveDate {
        self.days[0]
    }

    pub fn last_day(&self) -> NaiveDate {
        self.days[DAYS_PER_WEEK - 1]
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.last_day() && end >= self.first_day()
    }

    /// Column of `date` within this row, if the row shows it.
    pub fn column_of(&self, date: NaiveDate) -> Option<usize> {
        self.days.iter().position(|day| *day == date)
    }
}

/// Lays out the month as consecutive 7-day rows.
///
/// The first row is padded with trailing days of the previous month so
/// column 0 is `week_start`; the last row is padded with leading days of
/// the next month.
#[tracing::instrument(skip_all, fields(month = %window, week_start = ?week_start))]
pub fn build_month_grid(window: &MonthWindow, week_start: Weekday) -> Vec<WeekRow> {
    let month_start = window.month_start();
    let lead = weekday_offset(month_start.weekday(), week_start);

    let mut cells: Vec<NaiveDate> = (1..=lead)
        .rev()
        .map(|back| add_days(month_start, -back))
        .collect();
    cells.extend(month_start.iter_days().take_while(|day| window.contains(*day)));

    let trail = (DAYS_PER_WEEK - cells.len() % DAYS_PER_WEEK) % DAYS_PER_WEEK;
    let month_end = window.month_end();
    cells.extend((1..=trail as i64).map(|ahead| add_days(month_end, ahead)));

    let weeks: Vec<WeekRow> = cells
        .chunks_exact(DAYS_PER_WEEK)
        .enumerate()
        .map(|(week_index, chunk)| {
            let mut days = [month_start; DAYS_PER_WEEK];
            days.copy_from_slice(chunk);
            WeekRow { week_index, days }
        })
        .collect();

    trace!(lead, trail, rows = weeks.len(), "built month grid");
    weeks
}
