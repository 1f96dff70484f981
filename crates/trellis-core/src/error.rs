use thiserror::Error;

/// Fatal layout failures.
///
/// Only the month window can make a computation fail as a whole. Problems
/// with individual intervals are never errors; they are reported as
/// [`SkipReason`](crate::clip::SkipReason)s instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Month index outside `0..=11`.
    #[error("invalid month index {month_index}: expected 0..=11")]
    InvalidMonth { month_index: u32 },

    /// Year that the calendar types cannot represent.
    #[error("year {year} is outside the supported calendar range")]
    YearOutOfRange { year: i32 },
}
