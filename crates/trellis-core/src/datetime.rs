use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  NaiveDate,
  NaiveDateTime,
  Utc,
  Weekday
};
use chrono_tz::Tz;
use regex::Regex;

use crate::month::MonthWindow;

const OFFSET_DATETIME_FORMATS: [&str; 4] = [
  "%Y-%m-%dT%H:%M%:z",
  "%Y-%m-%dT%H:%M%z",
  "%Y-%m-%dT%H:%M:%S%.f%:z",
  "%Y-%m-%dT%H:%M:%S%.f%z"
];

const NAIVE_DATETIME_FORMATS: [&str; 6] = [
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%d %H:%M"
];

/// Calendar date of an interval bound.
///
/// Plain dates and naive date-times keep
/// the date as written. Instants with an
/// offset (RFC 3339, or the compact
/// `YYYYMMDDTHHMMSSZ` form) land on the
/// calendar day they fall on in `zone`.
pub fn parse_interval_date(
  raw: &str,
  zone: &Tz
) -> Option<NaiveDate> {
  let token = raw.trim();
  if token.is_empty() {
    return None;
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    return Some(date);
  }

  if let Ok(dt) =
    DateTime::parse_from_rfc3339(token)
  {
    return Some(
      dt.with_timezone(zone)
        .date_naive()
    );
  }

  // ISO 8601 forms RFC 3339 rejects:
  // minutes-only times and `+hhmm`.
  if let Some(dt) = OFFSET_DATETIME_FORMATS
    .iter()
    .find_map(|fmt| {
      DateTime::parse_from_str(token, fmt)
        .ok()
    })
  {
    return Some(
      dt.with_timezone(zone)
        .date_naive()
    );
  }

  if let Ok(ndt) =
    NaiveDateTime::parse_from_str(
      token,
      "%Y%m%dT%H%M%SZ"
    )
  {
    return Some(
      ndt
        .and_utc()
        .with_timezone(zone)
        .date_naive()
    );
  }

  NAIVE_DATETIME_FORMATS
    .iter()
    .find_map(|fmt| {
      NaiveDateTime::parse_from_str(
        token, fmt
      )
      .ok()
    })
    .map(|ndt| ndt.date())
}

pub fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => Some(tz),
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

pub fn today_in_timezone(
  zone: Tz
) -> NaiveDate {
  Utc::now()
    .with_timezone(&zone)
    .date_naive()
}

/// Resolves a month argument against
/// `today`.
#[tracing::instrument(skip(today), fields(input = input))]
pub fn parse_month_expr(
  input: &str,
  today: NaiveDate
) -> anyhow::Result<MonthWindow> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();
  let current =
    MonthWindow::from_date(today)?;

  match lower.as_str() {
    | "" | "this" | "now" | "today" => {
      return Ok(current);
    }
    | "next" => return Ok(current.shift(1)?),
    | "prev" | "previous" | "last" => {
      return Ok(current.shift(-1)?);
    }
    | _ => {}
  }

  let rel_re = Regex::new(
    r"^(?P<sign>[+-])(?P<num>\d{1,6})m$"
  )
  .map_err(|e| {
    anyhow!(
      "internal regex compile \
       failure: {e}"
    )
  })?;
  if let Some(caps) =
    rel_re.captures(&lower)
  {
    let num: i32 = caps["num"]
      .parse()
      .context("invalid relative month count")?;
    let step = if &caps["sign"] == "-" {
      -num
    } else {
      num
    };
    return Ok(current.shift(step)?);
  }

  let ym_re = Regex::new(
    r"^(?P<year>\d{4})[-/](?P<month>\d{1,2})$"
  )
  .map_err(|e| {
    anyhow!(
      "internal regex compile \
       failure: {e}"
    )
  })?;
  if let Some(caps) =
    ym_re.captures(token)
  {
    let year: i32 = caps["year"]
      .parse()
      .context("invalid year")?;
    let month: u32 = caps["month"]
      .parse()
      .context("invalid month")?;
    let month_index = month
      .checked_sub(1)
      .ok_or_else(|| {
        anyhow!(
          "month number must be 1-12, \
           got {month}"
        )
      })?;
    return Ok(MonthWindow::new(
      year,
      month_index
    )?);
  }

  if let Some(month) =
    parse_month_name(&lower)
  {
    return Ok(MonthWindow::new(
      current.year(),
      month - 1
    )?);
  }

  Err(anyhow!(
    "unrecognized month expression: \
     {input}"
  ))
  .with_context(|| {
    "supported formats: this/now, \
     next, prev/last, +Nm/-Nm, \
     YYYY-MM, YYYY/M, month names \
     (e.g. march)"
  })
}

pub fn parse_weekday_name(
  token: &str
) -> Option<Weekday> {
  match token
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "monday" | "mon" => {
      Some(Weekday::Mon)
    }
    | "tuesday" | "tue" | "tues" => {
      Some(Weekday::Tue)
    }
    | "wednesday" | "wed" => {
      Some(Weekday::Wed)
    }
    | "thursday" | "thu" | "thur"
    | "thurs" => Some(Weekday::Thu),
    | "friday" | "fri" => {
      Some(Weekday::Fri)
    }
    | "saturday" | "sat" => {
      Some(Weekday::Sat)
    }
    | "sunday" | "sun" => {
      Some(Weekday::Sun)
    }
    | _ => None
  }
}

fn parse_month_name(
  token: &str
) -> Option<u32> {
  match token.trim() {
    | "january" | "jan" => Some(1),
    | "february" | "feb" => Some(2),
    | "march" | "mar" => Some(3),
    | "april" | "apr" => Some(4),
    | "may" => Some(5),
    | "june" | "jun" => Some(6),
    | "july" | "jul" => Some(7),
    | "august" | "aug" => Some(8),
    | "september" | "sep" | "sept" => {
      Some(9)
    }
    | "october" | "oct" => Some(10),
    | "november" | "nov" => Some(11),
    | "december" | "dec" => Some(12),
    | _ => None
  }
}
