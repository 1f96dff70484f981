use std::fmt;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::datetime::parse_interval_date;
use crate::interval::Interval;
use crate::month::MonthWindow;

/// An interval restricted to the visible month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClippedInterval {
    pub interval_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub display_start: NaiveDate,
    pub display_end: NaiveDate,
    pub starts_before_window: bool,
    pub ends_after_window: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DateField {
    StartDate,
    EndDate,
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateField::StartDate => f.write_str("startDate"),
            DateField::EndDate => f.write_str("endDate"),
        }
    }
}

/// Why an interval was left out of the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SkipReason {
    Deleted,
    MissingDate { field: DateField },
    UnparsableDate { field: DateField, raw: String },
    InvertedRange { start: NaiveDate, end: NaiveDate },
    OutsideWindow,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Deleted => f.write_str("marked deleted"),
            SkipReason::MissingDate { field } => write!(f, "missing {field}"),
            SkipReason::UnparsableDate { field, raw } => {
                write!(f, "unparsable {field}: {raw:?}")
            }
            SkipReason::InvertedRange { start, end } => {
                write!(f, "ends before it starts ({start} > {end})")
            }
            SkipReason::OutsideWindow => f.write_str("outside the visible month"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedInterval {
    pub interval_id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClipReport {
    pub clipped: Vec<ClippedInterval>,
    pub skipped: Vec<SkippedInterval>,
}

/// Clamps every usable interval to `window`, preserving input order.
pub fn clip_intervals(intervals: &[Interval], window: &MonthWindow, zone: &Tz) -> Vec<ClippedInterval> {
    clip_report(intervals, window, zone).clipped
}

/// Like [`clip_intervals`] but also returns what was dropped and why.
#[tracing::instrument(skip(intervals, zone), fields(month = %window, count = intervals.len()))]
pub fn clip_report(intervals: &[Interval], window: &MonthWindow, zone: &Tz) -> ClipReport {
    let mut report = ClipReport::default();

    for interval in intervals {
        match clip_one(interval, window, zone) {
            Ok(clipped) => report.clipped.push(clipped),
            Err(reason) => {
                debug!(id = %interval.id, %reason, "skipping interval");
                report.skipped.push(SkippedInterval {
                    interval_id: interval.id.clone(),
                    reason,
                });
            }
        }
    }

    debug!(
        clipped = report.clipped.len(),
        skipped = report.skipped.len(),
        "clipped intervals to month"
    );
    report
}

fn clip_one(interval: &Interval, window: &MonthWindow, zone: &Tz) -> Result<ClippedInterval, SkipReason> {
    if interval.is_deleted {
        return Err(SkipReason::Deleted);
    }

    let start = resolve_date(interval.start_date.as_deref(), DateField::StartDate, zone)?;
    let end = resolve_date(interval.end_date.as_deref(), DateField::EndDate, zone)?;

    if end < start {
        return Err(SkipReason::InvertedRange { start, end });
    }

    let month_start = window.month_start();
    let month_end = window.month_end();
    if end < month_start || start > month_end {
        return Err(SkipReason::OutsideWindow);
    }

    Ok(ClippedInterval {
        interval_id: interval.id.clone(),
        start_date: start,
        end_date: end,
        display_start: start.max(month_start),
        display_end: end.min(month_end),
        starts_before_window: start < month_start,
        ends_after_window: end > month_end,
    })
}

fn resolve_date(raw: Option<&str>, field: DateField, zone: &Tz) -> Result<NaiveDate, SkipReason> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SkipReason::MissingDate { field })?;
    parse_interval_date(raw, zone).ok_or_else(|| SkipReason::UnparsableDate {
        field,
        raw: raw.to_string(),
    })
}
