use std::collections::BTreeMap;

use serde::Serialize;
use tracing::trace;

use crate::clip::ClippedInterval;
use crate::grid::WeekRow;

/// Column range of one interval inside one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub interval_id: String,
    /// Position of the originating interval in the clipped list.
    #[serde(skip)]
    pub source_index: usize,
    pub day_start: usize,
    pub day_end: usize,
}

impl Span {
    /// Extra columns covered past `day_start`; zero for a single day.
    pub fn length(&self) -> usize {
        self.day_end - self.day_start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.day_start <= other.day_end && other.day_start <= self.day_end
    }
}

/// Buckets every clipped interval into the weeks it touches.
///
/// Weeks without any span get no entry.
#[tracing::instrument(skip_all, fields(intervals = clipped.len(), weeks = weeks.len()))]
pub fn assign_weeks(clipped: &[ClippedInterval], weeks: &[WeekRow]) -> BTreeMap<usize, Vec<Span>> {
    let mut buckets: BTreeMap<usize, Vec<Span>> = BTreeMap::new();

    for (source_index, interval) in clipped.iter().enumerate() {
        for week in weeks {
            let Some((day_start, day_end)) = columns_in_week(interval, week) else {
                continue;
            };
            trace!(
                id = %interval.interval_id,
                week = week.week_index,
                day_start,
                day_end,
                "assigned span"
            );
            buckets.entry(week.week_index).or_default().push(Span {
                interval_id: interval.interval_id.clone(),
                source_index,
                day_start,
                day_end,
            });
        }
    }

    buckets
}

fn columns_in_week(interval: &ClippedInterval, week: &WeekRow) -> Option<(usize, usize)> {
    if !week.overlaps(interval.display_start, interval.display_end) {
        return None;
    }
    let day_start = week.days.iter().position(|day| *day >= interval.display_start)?;
    let day_end = week.days.iter().rposition(|day| *day <= interval.display_end)?;
    Some((day_start, day_end))
}
