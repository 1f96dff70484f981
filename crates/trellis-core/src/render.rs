use std::collections::{HashMap, HashSet};
use std::io::{self, IsTerminal, Write};

use chrono::{Datelike, Weekday};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::clip::SkippedInterval;
use crate::config::Config;
use crate::grid::DAYS_PER_WEEK;
use crate::interval::Interval;
use crate::layout::{MonthLayout, PlacedSegment};

const CELL_WIDTH: usize = 12;

/// Plain-text presentation of a [`MonthLayout`].
#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    label_field: String,
    max_rows: usize,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            color: cfg.display.color && io::stdout().is_terminal(),
            label_field: cfg.display.label_field.clone(),
            max_rows: cfg.display.max_rows,
        }
    }

    pub fn plain(label_field: &str, max_rows: usize) -> Self {
        Self {
            color: false,
            label_field: label_field.to_string(),
            max_rows,
        }
    }

    #[tracing::instrument(skip_all, fields(month = %layout.window))]
    pub fn write_grid<W: Write>(&self, mut out: W, layout: &MonthLayout) -> anyhow::Result<()> {
        writeln!(out, "{}", layout.window.label())?;
        for label in weekday_labels(layout.week_start) {
            write!(out, "{label:>4}")?;
        }
        writeln!(out)?;

        for week in &layout.weeks {
            for day in week.days {
                let cell = if layout.window.contains(day) {
                    format!(" {:>2} ", day.day())
                } else {
                    self.paint(&format!("({:>2})", day.day()), "90")
                };
                write!(out, "{cell}")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Draws every week as a date line followed by its bar rows.
    ///
    /// `<` and `>` mark bars that continue into the previous or next week
    /// (or beyond the month). Rows past `max_rows` collapse into a
    /// `+N more` line.
    #[tracing::instrument(skip_all, fields(month = %layout.window, segments = layout.segments.len()))]
    pub fn write_timeline<W: Write>(
        &self,
        mut out: W,
        layout: &MonthLayout,
        intervals: &[Interval],
    ) -> anyhow::Result<()> {
        let by_id: HashMap<&str, &Interval> = intervals.iter().map(|i| (i.id.as_str(), i)).collect();
        let present: HashSet<(&str, usize)> = layout
            .segments
            .iter()
            .map(|s| (s.interval_id.as_str(), s.week_index))
            .collect();
        let hidden = layout.hidden_counts(self.max_rows);

        writeln!(out, "{}", layout.window.label())?;
        for label in weekday_labels(layout.week_start) {
            write!(out, "{label:<CELL_WIDTH$}")?;
        }
        writeln!(out)?;

        for week in &layout.weeks {
            for day in week.days {
                let text = if layout.window.contains(day) {
                    day.format("%d").to_string()
                } else {
                    format!("({})", day.format("%d"))
                };
                write!(out, "{text:<CELL_WIDTH$}")?;
            }
            writeln!(out)?;

            let rows = layout.row_count(week.week_index).min(self.max_rows);
            for row in 0..rows {
                let mut in_row: Vec<&PlacedSegment> = layout
                    .segments_in_week(week.week_index)
                    .filter(|s| s.row_index == row)
                    .collect();
                in_row.sort_by_key(|s| s.day_start);

                let mut line = String::new();
                let mut col = 0;
                for segment in in_row {
                    line.push_str(&" ".repeat((segment.day_start - col) * CELL_WIDTH));
                    let continues_before = segment.starts_before_window
                        || (segment.week_index > 0
                            && present.contains(&(segment.interval_id.as_str(), segment.week_index - 1)));
                    let continues_after = segment.ends_after_window
                        || present.contains(&(segment.interval_id.as_str(), segment.week_index + 1));
                    let label = by_id
                        .get(segment.interval_id.as_str())
                        .and_then(|interval| interval.payload_str(&self.label_field))
                        .unwrap_or(segment.interval_id.as_str());
                    let width = (segment.day_end - segment.day_start + 1) * CELL_WIDTH - 1;
                    let bar = draw_bar(label, width, continues_before, continues_after);
                    line.push_str(&self.paint(&bar, "36"));
                    line.push(' ');
                    col = segment.day_end + 1;
                }
                writeln!(out, "{}", line.trim_end())?;
            }

            let overflow = &hidden[week.week_index];
            if overflow.iter().any(|n| *n > 0) {
                let mut line = String::new();
                for count in overflow {
                    let text = if *count > 0 {
                        format!("+{count} more")
                    } else {
                        String::new()
                    };
                    line.push_str(&format!("{text:<CELL_WIDTH$}"));
                }
                writeln!(out, "{}", line.trim_end())?;
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(count = skipped.len()))]
    pub fn write_skipped<W: Write>(&self, out: W, skipped: &[SkippedInterval]) -> anyhow::Result<()> {
        let headers = vec!["ID".to_string(), "Reason".to_string()];
        let rows = skipped
            .iter()
            .map(|entry| vec![self.paint(&entry.interval_id, "33"), entry.reason.to_string()])
            .collect();
        write_table(out, headers, rows)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn weekday_labels(week_start: Weekday) -> Vec<String> {
    let mut day = week_start;
    (0..DAYS_PER_WEEK)
        .map(|_| {
            let label = day.to_string();
            day = day.succ();
            label
        })
        .collect()
}

fn draw_bar(label: &str, width: usize, continues_before: bool, continues_after: bool) -> String {
    let open = if continues_before { '<' } else { '[' };
    let close = if continues_after { '>' } else { ']' };
    let inner = width.saturating_sub(2);
    let text = truncate_to_width(label, inner);
    let padding = inner.saturating_sub(UnicodeWidthStr::width(text.as_str()));
    format!("{open}{text}{}{close}", " ".repeat(padding))
}

fn truncate_to_width(text: &str, max: usize) -> String {
    if UnicodeWidthStr::width(text) <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    if max > 0 {
        out.push('…');
    }
    out
}

fn write_table<W: Write>(mut writer: W, headers: Vec<String>, rows: Vec<Vec<String>>) -> anyhow::Result<()> {
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|header| UnicodeWidthStr::width(header.as_str()))
        .collect();

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, &width) in headers.iter().zip(&widths) {
        write!(writer, "{header:width$} ")?;
    }
    writeln!(writer)?;
    for &width in &widths {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, &width) in row.iter().zip(&widths) {
            let visible = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            write!(writer, "{}{} ", cell, " ".repeat(width.saturating_sub(visible)))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;
    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }
        if ch == '\x1b' {
            escaped = true;
            continue;
        }
        out.push(ch);
    }
    out
}
