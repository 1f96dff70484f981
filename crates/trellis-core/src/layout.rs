use chrono::Weekday;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info};

use crate::assign::assign_weeks;
use crate::clip::{ClippedInterval, clip_intervals};
use crate::error::LayoutError;
use crate::grid::{DAYS_PER_WEEK, WeekRow, build_month_grid};
use crate::interval::Interval;
use crate::month::MonthWindow;
use crate::pack::pack_week;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutOptions {
    pub week_start: Weekday,
    /// Zone used to turn offset timestamps into calendar days.
    pub zone: Tz,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            week_start: Weekday::Sun,
            zone: chrono_tz::UTC,
        }
    }
}

/// One bar of one interval in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedSegment {
    pub interval_id: String,
    pub week_index: usize,
    pub day_start: usize,
    pub day_end: usize,
    pub row_index: usize,
    pub starts_before_window: bool,
    pub ends_after_window: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthLayout {
    pub window: MonthWindow,
    pub week_start: Weekday,
    pub weeks: Vec<WeekRow>,
    #[serde(rename = "placedSegments")]
    pub segments: Vec<PlacedSegment>,
}

impl MonthLayout {
    pub fn segments_in_week(&self, week_index: usize) -> impl Iterator<Item = &PlacedSegment> {
        self.segments
            .iter()
            .filter(move |segment| segment.week_index == week_index)
    }

    pub fn segments_for<'a>(&'a self, interval_id: &'a str) -> impl Iterator<Item = &'a PlacedSegment> {
        self.segments
            .iter()
            .filter(move |segment| segment.interval_id == interval_id)
    }

    /// Rows used by the given week; zero when nothing is placed there.
    pub fn row_count(&self, week_index: usize) -> usize {
        self.segments_in_week(week_index)
            .map(|segment| segment.row_index + 1)
            .max()
            .unwrap_or(0)
    }

    /// Per week and day, how many segments sit at or beyond `max_rows`.
    pub fn hidden_counts(&self, max_rows: usize) -> Vec<[usize; DAYS_PER_WEEK]> {
        let mut counts = vec![[0usize; DAYS_PER_WEEK]; self.weeks.len()];
        for segment in self.segments.iter().filter(|s| s.row_index >= max_rows) {
            let Some(week) = counts.get_mut(segment.week_index) else {
                continue;
            };
            for day in &mut week[segment.day_start..=segment.day_end] {
                *day += 1;
            }
        }
        counts
    }
}

/// Runs the whole pipeline for one month.
///
/// Every week is packed on its own, so one interval can sit in different
/// rows in consecutive weeks. Segments come out ordered by week, row, and
/// first column.
#[tracing::instrument(skip(intervals, options), fields(month = %window, intervals = intervals.len()))]
pub fn compute_layout(window: &MonthWindow, intervals: &[Interval], options: &LayoutOptions) -> MonthLayout {
    let weeks = build_month_grid(window, options.week_start);
    let clipped = clip_intervals(intervals, window, &options.zone);
    let buckets = assign_weeks(&clipped, &weeks);

    let mut segments = Vec::new();
    for (week_index, spans) in buckets {
        for packed in pack_week(spans) {
            let source: &ClippedInterval = &clipped[packed.span.source_index];
            segments.push(PlacedSegment {
                interval_id: packed.span.interval_id,
                week_index,
                day_start: packed.span.day_start,
                day_end: packed.span.day_end,
                row_index: packed.row_index,
                starts_before_window: source.starts_before_window,
                ends_after_window: source.ends_after_window,
            });
        }
    }
    segments.sort_by_key(|s| (s.week_index, s.row_index, s.day_start));

    debug!(
        weeks = weeks.len(),
        visible = clipped.len(),
        segments = segments.len(),
        "computed month layout"
    );

    MonthLayout {
        window: *window,
        week_start: options.week_start,
        weeks,
        segments,
    }
}

/// [`compute_layout`] for a raw year and zero-based month index.
pub fn compute_month_layout(
    year: i32,
    month_index: u32,
    intervals: &[Interval],
    options: &LayoutOptions,
) -> Result<MonthLayout, LayoutError> {
    let window = MonthWindow::new(year, month_index).inspect_err(|err| {
        info!(year, month_index, error = %err, "rejected month window");
    })?;
    Ok(compute_layout(&window, intervals, options))
}
