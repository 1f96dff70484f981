use std::fmt;

use chrono::{
  Datelike,
  Duration,
  Months,
  NaiveDate,
  Weekday
};
use serde::Serialize;

use crate::error::LayoutError;

/// Calendar days a grid can borrow from
/// either neighbouring month.
const MAX_PADDING_DAYS: i64 = 7;

/// One visible calendar month.
///
/// `month_index` is zero-based (January
/// is 0). Construction validates both the
/// index and that the padded grid around
/// the month is representable, so every
/// later stage is infallible.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
)]
#[serde(rename_all = "camelCase")]
pub struct MonthWindow {
  year:        i32,
  month_index: u32,
  month_start: NaiveDate,
  month_end:   NaiveDate
}

impl MonthWindow {
  pub fn new(
    year: i32,
    month_index: u32
  ) -> Result<Self, LayoutError> {
    if month_index > 11 {
      return Err(
        LayoutError::InvalidMonth {
          month_index
        }
      );
    }

    let out_of_range =
      || LayoutError::YearOutOfRange {
        year
      };

    let month_start =
      NaiveDate::from_ymd_opt(
        year,
        month_index + 1,
        1
      )
      .ok_or_else(out_of_range)?;
    let month_end = month_start
      .checked_add_months(Months::new(1))
      .and_then(|next| next.pred_opt())
      .ok_or_else(out_of_range)?;

    month_start
      .checked_sub_signed(Duration::days(
        MAX_PADDING_DAYS
      ))
      .ok_or_else(out_of_range)?;
    month_end
      .checked_add_signed(Duration::days(
        MAX_PADDING_DAYS
      ))
      .ok_or_else(out_of_range)?;

    Ok(Self {
      year,
      month_index,
      month_start,
      month_end
    })
  }

  pub fn from_date(
    date: NaiveDate
  ) -> Result<Self, LayoutError> {
    Self::new(date.year(), date.month0())
  }

  /// Moves the window by whole months in
  /// either direction.
  pub fn shift(
    &self,
    months: i32
  ) -> Result<Self, LayoutError> {
    let absolute = i64::from(self.year)
      * 12
      + i64::from(self.month_index)
      + i64::from(months);
    let year = i32::try_from(
      absolute.div_euclid(12)
    )
    .map_err(|_| {
      LayoutError::YearOutOfRange {
        year: if months < 0 {
          i32::MIN
        } else {
          i32::MAX
        }
      }
    })?;
    let month_index =
      absolute.rem_euclid(12) as u32;
    Self::new(year, month_index)
  }

  pub fn year(&self) -> i32 {
    self.year
  }

  pub fn month_index(&self) -> u32 {
    self.month_index
  }

  pub fn month_start(&self) -> NaiveDate {
    self.month_start
  }

  pub fn month_end(&self) -> NaiveDate {
    self.month_end
  }

  pub fn days_in_month(&self) -> u32 {
    self.month_end.day()
  }

  pub fn contains(
    &self,
    date: NaiveDate
  ) -> bool {
    date >= self.month_start
      && date <= self.month_end
  }

  /// Human label such as `March 2024`.
  pub fn label(&self) -> String {
    self
      .month_start
      .format("%B %Y")
      .to_string()
  }
}

impl fmt::Display for MonthWindow {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{:04}-{:02}",
      self.year,
      self.month_index + 1
    )
  }
}

/// Columns between `week_start` and
/// `day`'s weekday, in `0..7`.
pub(crate) fn weekday_offset(
  day: Weekday,
  week_start: Weekday
) -> i64 {
  let day_idx =
    day.num_days_from_monday() as i64;
  let start_idx = week_start
    .num_days_from_monday()
    as i64;
  (7 + day_idx - start_idx) % 7
}

pub(crate) fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .unwrap_or(date)
}

#[cfg(test)]
mod tests {
  use chrono::{
    NaiveDate,
    Weekday
  };

  use super::{
    MonthWindow,
    weekday_offset
  };
  use crate::error::LayoutError;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn derives_inclusive_bounds() {
    let feb = MonthWindow::new(2024, 1)
      .expect("valid window");
    assert_eq!(
      feb.month_start(),
      date(2024, 2, 1)
    );
    assert_eq!(
      feb.month_end(),
      date(2024, 2, 29)
    );
    assert_eq!(feb.days_in_month(), 29);

    let dec = MonthWindow::new(2023, 11)
      .expect("valid window");
    assert_eq!(
      dec.month_end(),
      date(2023, 12, 31)
    );
    assert_eq!(dec.to_string(), "2023-12");
    assert_eq!(dec.label(), "December 2023");
  }

  #[test]
  fn rejects_month_index_past_december()
  {
    assert_eq!(
      MonthWindow::new(2024, 12),
      Err(LayoutError::InvalidMonth {
        month_index: 12
      })
    );
  }

  #[test]
  fn rejects_unrepresentable_year() {
    assert!(matches!(
      MonthWindow::new(i32::MAX, 0),
      Err(
        LayoutError::YearOutOfRange { .. }
      )
    ));
  }

  #[test]
  fn shifts_across_year_boundaries() {
    let jan = MonthWindow::new(2024, 0)
      .expect("valid window");
    let prev =
      jan.shift(-1).expect("shift back");
    assert_eq!(prev.year(), 2023);
    assert_eq!(prev.month_index(), 11);

    let later =
      jan.shift(25).expect("shift ahead");
    assert_eq!(later.year(), 2026);
    assert_eq!(later.month_index(), 1);
  }

  #[test]
  fn offsets_follow_week_start() {
    assert_eq!(
      weekday_offset(
        Weekday::Fri,
        Weekday::Sun
      ),
      5
    );
    assert_eq!(
      weekday_offset(
        Weekday::Sun,
        Weekday::Mon
      ),
      6
    );
    assert_eq!(
      weekday_offset(
        Weekday::Mon,
        Weekday::Mon
      ),
      0
    );
  }
}
