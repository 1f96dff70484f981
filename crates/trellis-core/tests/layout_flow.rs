use std::fs;

use chrono::{NaiveDate, Weekday};
use serde_json::{Value, json};
use tempfile::tempdir;
use trellis_core::clip::clip_intervals;
use trellis_core::source::{load_intervals, write_atomic};
use trellis_core::{Interval, LayoutError, LayoutOptions, MonthWindow, compute_layout, compute_month_layout};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn march_2024() -> MonthWindow {
    MonthWindow::new(2024, 2).expect("valid window")
}

#[test]
fn nested_project_in_same_week_gets_another_row() {
    let intervals = vec![
        Interval::new("X", "2024-03-05", "2024-03-08"),
        Interval::new("Y", "2024-03-06", "2024-03-07"),
    ];
    let layout = compute_layout(&march_2024(), &intervals, &LayoutOptions::default());

    assert_eq!(layout.segments.len(), 2);
    let x = &layout.segments[0];
    let y = &layout.segments[1];
    assert_eq!((x.interval_id.as_str(), x.week_index, x.row_index), ("X", 1, 0));
    assert_eq!((y.interval_id.as_str(), y.week_index, y.row_index), ("Y", 1, 1));
    assert_eq!((x.day_start, x.day_end), (2, 5));
    assert_eq!((y.day_start, y.day_end), (3, 4));
}

#[test]
fn project_from_previous_month_is_clamped_and_flagged() {
    let intervals = vec![Interval::new("Z", "2024-02-25", "2024-03-10")];
    let clipped = clip_intervals(&intervals, &march_2024(), &chrono_tz::UTC);

    assert_eq!(clipped.len(), 1);
    assert!(clipped[0].starts_before_window);
    assert!(!clipped[0].ends_after_window);
    assert_eq!(clipped[0].display_start, date(2024, 3, 1));
    assert_eq!(clipped[0].display_end, date(2024, 3, 10));

    let layout = compute_layout(&march_2024(), &intervals, &LayoutOptions::default());
    let weeks: Vec<usize> = layout.segments_for("Z").map(|s| s.week_index).collect();
    assert_eq!(weeks, vec![0, 1, 2]);
    assert!(layout.segments_for("Z").all(|s| s.starts_before_window && !s.ends_after_window));
}

#[test]
fn empty_input_still_builds_the_grid() {
    for month_index in 0..12 {
        let layout = compute_month_layout(2024, month_index, &[], &LayoutOptions::default())
            .expect("valid month");
        assert!(layout.segments.is_empty());
        assert!((5..=6).contains(&layout.weeks.len()), "month {month_index}");
    }
}

#[test]
fn february_beginning_on_week_start_needs_only_four_weeks() {
    let sunday_first = compute_month_layout(2026, 1, &[], &LayoutOptions::default()).expect("valid month");
    assert!(sunday_first.segments.is_empty());
    assert_eq!(sunday_first.weeks.len(), 4);
    assert_eq!(sunday_first.weeks[0].days[0], date(2026, 2, 1));
    assert_eq!(sunday_first.weeks[3].days[6], date(2026, 2, 28));

    // Any other week start pushes the same month back to five rows.
    let monday_first = compute_month_layout(
        2026,
        1,
        &[],
        &LayoutOptions {
            week_start: Weekday::Mon,
            ..LayoutOptions::default()
        },
    )
    .expect("valid month");
    assert_eq!(monday_first.weeks.len(), 5);
}

#[test]
fn inverted_and_deleted_projects_are_dropped() {
    let intervals = vec![
        Interval::new("backwards", "2024-03-12", "2024-03-04"),
        Interval::new("archived", "2024-03-04", "2024-03-12").deleted(),
        Interval::new("ok", "2024-03-04", "2024-03-04"),
    ];
    let layout = compute_layout(&march_2024(), &intervals, &LayoutOptions::default());

    let ids: Vec<&str> = layout.segments.iter().map(|s| s.interval_id.as_str()).collect();
    assert_eq!(ids, vec!["ok"]);
}

#[test]
fn invalid_month_fails_the_whole_computation() {
    let intervals = vec![Interval::new("a", "2024-03-01", "2024-03-02")];
    assert_eq!(
        compute_month_layout(2024, 13, &intervals, &LayoutOptions::default()),
        Err(LayoutError::InvalidMonth { month_index: 13 })
    );
}

#[test]
fn repeated_runs_serialize_identically() {
    let intervals = vec![
        Interval::new("a", "2024-02-20", "2024-03-20"),
        Interval::new("b", "2024-03-03", "2024-03-09"),
        Interval::new("c", "2024-03-03", "2024-03-04"),
        Interval::new("d", "2024-03-28", "2024-04-15"),
    ];
    let options = LayoutOptions {
        week_start: Weekday::Mon,
        ..LayoutOptions::default()
    };

    let first = serde_json::to_string(&compute_layout(&march_2024(), &intervals, &options)).expect("json");
    let second = serde_json::to_string(&compute_layout(&march_2024(), &intervals, &options)).expect("json");
    assert_eq!(first, second);
}

#[test]
fn layout_json_uses_camel_case_contract() {
    let intervals = vec![Interval::new("p-9", "2024-03-30", "2024-04-02")];
    let layout = compute_layout(&march_2024(), &intervals, &LayoutOptions::default());
    let value = serde_json::to_value(&layout).expect("json");

    assert_eq!(value["window"]["monthIndex"], json!(2));
    assert_eq!(value["weeks"][0]["weekIndex"], json!(0));
    assert_eq!(value["weeks"][0]["days"][0], json!("2024-02-25"));

    assert!(value.get("segments").is_none());
    let segments = value["placedSegments"].as_array().expect("placedSegments array");
    assert_eq!(segments.len(), 2);
    assert_eq!(
        segments[0],
        json!({
            "intervalId": "p-9",
            "weekIndex": 4,
            "dayStart": 6,
            "dayEnd": 6,
            "rowIndex": 0,
            "startsBeforeWindow": false,
            "endsAfterWindow": true
        })
    );
    assert_eq!(segments[1]["weekIndex"], Value::from(5));
}

#[test]
fn file_round_trip_through_source_layer() {
    let temp = tempdir().expect("tempdir");
    let input = temp.path().join("projects.jsonl");
    fs::write(
        &input,
        "{\"id\": 1, \"startDate\": \"2024-03-01T09:00:00-06:00\", \"endDate\": \"2024-03-02\", \"payload\": {\"name\": \"Launch\"}}\n\
         {\"id\": 2, \"startDate\": \"not a date\", \"endDate\": \"2024-03-02\"}\n",
    )
    .expect("write input");

    let intervals = load_intervals(&input).expect("load");
    let layout = compute_layout(&march_2024(), &intervals, &LayoutOptions::default());
    assert_eq!(layout.segments.len(), 1);
    assert_eq!(layout.segments[0].interval_id, "1");

    let output = temp.path().join("out").join("layout.json");
    fs::create_dir_all(output.parent().expect("parent")).expect("mkdir");
    let json = serde_json::to_string(&layout).expect("json");
    write_atomic(&output, &json).expect("write");
    let back: Value = serde_json::from_str(&fs::read_to_string(&output).expect("read")).expect("parse");
    assert_eq!(back["placedSegments"][0]["intervalId"], json!("1"));
}
