use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;
use trellis_core::clip::clip_intervals;
use trellis_core::{Interval, LayoutOptions, MonthWindow, compute_layout};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 10, 1).expect("valid date")
}

fn interval_strategy() -> impl Strategy<Value = (i64, i64)> {
    (0i64..540, 0i64..50)
}

fn to_intervals(raw: &[(i64, i64)]) -> Vec<Interval> {
    raw.iter()
        .enumerate()
        .map(|(idx, (offset, length))| {
            let start = base_date() + Duration::days(*offset);
            let end = start + Duration::days(*length);
            Interval::new(
                format!("p{idx}"),
                start.format("%Y-%m-%d").to_string(),
                end.format("%Y-%m-%d").to_string(),
            )
        })
        .collect()
}

fn week_start_strategy() -> impl Strategy<Value = Weekday> {
    prop_oneof![Just(Weekday::Sun), Just(Weekday::Mon), Just(Weekday::Sat)]
}

fn window_strategy() -> impl Strategy<Value = MonthWindow> {
    (2023i32..=2025, 0u32..12).prop_map(|(year, month)| MonthWindow::new(year, month).expect("valid window"))
}

proptest! {
    #[test]
    fn segments_never_share_a_cell(
        raw in prop::collection::vec(interval_strategy(), 0..40),
        window in window_strategy(),
        week_start in week_start_strategy(),
    ) {
        let intervals = to_intervals(&raw);
        let options = LayoutOptions { week_start, ..LayoutOptions::default() };
        let layout = compute_layout(&window, &intervals, &options);

        let mut cells: HashMap<(usize, usize, usize), &str> = HashMap::new();
        for segment in &layout.segments {
            prop_assert!(segment.day_start <= segment.day_end);
            prop_assert!(segment.day_end < 7);
            for day in segment.day_start..=segment.day_end {
                let previous = cells.insert((segment.week_index, segment.row_index, day), segment.interval_id.as_str());
                prop_assert!(previous.is_none(), "cell reused by {:?} and {}", previous, segment.interval_id);
            }
        }
    }

    #[test]
    fn grid_covers_the_month_with_whole_weeks(
        window in window_strategy(),
        week_start in week_start_strategy(),
    ) {
        let options = LayoutOptions { week_start, ..LayoutOptions::default() };
        let layout = compute_layout(&window, &[], &options);

        prop_assert!((4..=6).contains(&layout.weeks.len()));
        for (idx, week) in layout.weeks.iter().enumerate() {
            prop_assert_eq!(week.week_index, idx);
            prop_assert_eq!(week.days[0].weekday(), week_start);
            for pair in week.days.windows(2) {
                prop_assert_eq!(pair[1], pair[0] + Duration::days(1));
            }
        }
        let first = layout.weeks[0].days[0];
        let last = layout.weeks[layout.weeks.len() - 1].days[6];
        prop_assert!(first <= window.month_start());
        prop_assert!(last >= window.month_end());
        prop_assert!(window.month_start() - first < Duration::days(7));
        prop_assert!(last - window.month_end() < Duration::days(7));
    }

    #[test]
    fn clamped_ranges_stay_inside_the_month(
        raw in prop::collection::vec(interval_strategy(), 0..30),
        window in window_strategy(),
    ) {
        let intervals = to_intervals(&raw);
        for clipped in clip_intervals(&intervals, &window, &chrono_tz::UTC) {
            prop_assert!(window.month_start() <= clipped.display_start);
            prop_assert!(clipped.display_start <= clipped.display_end);
            prop_assert!(clipped.display_end <= window.month_end());
            prop_assert_eq!(clipped.starts_before_window, clipped.start_date < window.month_start());
            prop_assert_eq!(clipped.ends_after_window, clipped.end_date > window.month_end());
        }
    }

    #[test]
    fn shorter_span_never_sits_below_longer_one_with_same_start(
        raw in prop::collection::vec(interval_strategy(), 0..40),
        window in window_strategy(),
    ) {
        let intervals = to_intervals(&raw);
        let layout = compute_layout(&window, &intervals, &LayoutOptions::default());

        for a in &layout.segments {
            for b in &layout.segments {
                let same_start = a.week_index == b.week_index && a.day_start == b.day_start;
                if same_start && a.day_end < b.day_end {
                    prop_assert!(a.row_index <= b.row_index);
                }
            }
        }
    }

    #[test]
    fn layout_is_deterministic(
        raw in prop::collection::vec(interval_strategy(), 0..30),
        window in window_strategy(),
    ) {
        let intervals = to_intervals(&raw);
        let options = LayoutOptions::default();
        prop_assert_eq!(
            compute_layout(&window, &intervals, &options),
            compute_layout(&window, &intervals, &options)
        );
    }
}
