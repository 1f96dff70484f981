use tracing::trace;

use crate::interval::Interval;
use crate::layout::{LayoutOptions, MonthLayout, compute_layout};
use crate::month::MonthWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MemoKey {
    window: MonthWindow,
    options: LayoutOptions,
    intervals_version: u64,
}

/// Caller-owned cache of the most recent layout.
///
/// The caller bumps `intervals_version` whenever it replaces its interval
/// list; the memo never inspects the intervals to detect changes.
///
/// ```
/// use trellis_core::memo::LayoutMemo;
/// use trellis_core::{Interval, LayoutOptions, MonthWindow};
///
/// let march = MonthWindow::new(2024, 2)?;
/// let intervals = vec![Interval::new("a", "2024-03-01", "2024-03-02")];
/// let options = LayoutOptions::default();
///
/// let mut memo = LayoutMemo::new();
/// memo.get_or_compute(&march, &intervals, 1, &options);
/// let layout = memo.get_or_compute(&march, &intervals, 1, &options);
/// assert_eq!(layout.segments.len(), 1);
/// assert_eq!(memo.hits(), 1);
/// # Ok::<(), trellis_core::LayoutError>(())
/// ```
#[derive(Debug, Default)]
pub struct LayoutMemo {
    key: Option<MemoKey>,
    layout: Option<MonthLayout>,
    hits: u64,
}

impl LayoutMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &mut self,
        window: &MonthWindow,
        intervals: &[Interval],
        intervals_version: u64,
        options: &LayoutOptions,
    ) -> &MonthLayout {
        let key = MemoKey {
            window: *window,
            options: *options,
            intervals_version,
        };

        if self.key == Some(key) && self.layout.is_some() {
            self.hits += 1;
            trace!(month = %window, intervals_version, "layout memo hit");
        } else {
            self.key = Some(key);
            self.layout = None;
        }

        self.layout
            .get_or_insert_with(|| compute_layout(window, intervals, options))
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.layout = None;
    }
}
