use tracing::trace;

use crate::assign::Span;
use crate::grid::DAYS_PER_WEEK;

/// A span with its row inside the week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedSpan {
    pub span: Span,
    pub row_index: usize,
}

/// Per-week occupancy: one 7-bit column mask per row.
#[derive(Debug, Default)]
struct Occupancy {
    rows: Vec<u8>,
}

impl Occupancy {
    fn claim_lowest_free(&mut self, mask: u8) -> usize {
        let row = self
            .rows
            .iter()
            .position(|used| used & mask == 0)
            .unwrap_or(self.rows.len());
        if row == self.rows.len() {
            self.rows.push(0);
        }
        self.rows[row] |= mask;
        row
    }
}

fn column_mask(day_start: usize, day_end: usize) -> u8 {
    debug_assert!(day_start <= day_end && day_end < DAYS_PER_WEEK);
    let width = day_end - day_start + 1;
    (((1u16 << width) - 1) << day_start) as u8
}

/// Greedily stacks one week's spans into rows.
///
/// Spans are placed by ascending `day_start`, shorter first on ties, each
/// into the lowest row whose columns are still free. The result is in
/// placement order. Nothing carries over between calls.
pub fn pack_week(mut spans: Vec<Span>) -> Vec<PackedSpan> {
    spans.sort_by_key(|span| (span.day_start, span.length()));

    let mut occupancy = Occupancy::default();
    let packed: Vec<PackedSpan> = spans
        .into_iter()
        .map(|span| {
            let row_index = occupancy.claim_lowest_free(column_mask(span.day_start, span.day_end));
            PackedSpan { span, row_index }
        })
        .collect();

    trace!(spans = packed.len(), rows = occupancy.rows.len(), "packed week");
    packed
}
