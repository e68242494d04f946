//! Slot string parsing and formatting.
//!
//! Bookings store their time as free text in one of two shapes:
//!
//! - current: `"Jan. 2, 2025 - 1:00 PM"` (the only shape [`format`] emits)
//! - legacy:  `"01/02/2025 - 1:00 PM"` (still present in older records)
//!
//! The shapes are told apart by a comma in the date part. Parsing is total:
//! every input maps to either a [`ParsedInstant`] or an [`Unparsable`] reason.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub use crate::error::Unparsable;

/// Separator between the date part and the time part of a slot string.
pub const SEPARATOR: &str = " - ";

/// Month abbreviations in calendar order; the index is the month index (0 = January).
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Label shown in place of a slot that cannot be parsed.
pub const INVALID_DATE_LABEL: &str = "Invalid date";

/// A wall-clock minute read from a slot string.
///
/// Naive local time with seconds fixed at zero. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedInstant(NaiveDateTime);

impl ParsedInstant {
    /// Build an instant from calendar components. `month_index` is 0-based.
    ///
    /// Returns `None` when any component is outside the calendar (Feb 30, hour 24, ...).
    pub fn new(year: i32, month_index: u32, day: u32, hour: u32, minute: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month_index.checked_add(1)?, day)?
            .and_hms_opt(hour, minute, 0)
            .map(Self)
    }

    /// Truncate a naive datetime to the minute.
    pub fn from_naive(datetime: NaiveDateTime) -> Self {
        Self(
            datetime
                .date()
                .and_hms_opt(datetime.hour(), datetime.minute(), 0)
                .unwrap_or(datetime),
        )
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month_index(&self) -> u32 {
        self.0.month0()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Resolve this wall-clock time in `tz` to a UTC instant.
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant. Times that do
    /// not exist in `tz` (DST spring-forward gap) return `None`.
    pub fn to_utc(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        tz.from_local_datetime(&self.0)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl fmt::Display for ParsedInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(*self))
    }
}

impl FromStr for ParsedInstant {
    type Err = Unparsable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse a slot string in either the current or the legacy shape.
///
/// Only the first two `" - "`-separated pieces are considered. Out-of-range
/// components are rejected rather than rolled over into the next month or day.
pub fn parse(text: &str) -> Result<ParsedInstant, Unparsable> {
    let mut parts = text.split(SEPARATOR);
    let date_part = parts.next().filter(|p| !p.trim().is_empty());
    let time_part = parts.next().filter(|p| !p.trim().is_empty());
    let (Some(date_part), Some(time_part)) = (date_part, time_part) else {
        return Err(Unparsable::MissingPart(text.to_string()));
    };

    let (year, month_index, day) = if date_part.contains(',') {
        parse_current_date(date_part.trim())?
    } else {
        parse_legacy_date(date_part.trim())?
    };
    let (hour, minute) = parse_clock(time_part)?;

    ParsedInstant::new(year, month_index, day, hour, minute)
        .ok_or_else(|| Unparsable::OutOfRange(text.to_string()))
}

/// Format an instant in the current shape, e.g. `"May 5, 2025 - 2:00 PM"`.
pub fn format(instant: ParsedInstant) -> String {
    let (is_pm, hour) = instant.0.hour12();
    format!(
        "{}{}{}:{:02} {}",
        format_date(instant.date()),
        SEPARATOR,
        hour,
        instant.minute(),
        if is_pm { "PM" } else { "AM" }
    )
}

/// Format the date half of a current-shape slot string, e.g. `"Jan. 2, 2025"`.
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{} {}, {}",
        month_label(date.month0()),
        date.day(),
        date.year()
    )
}

/// Canonical rendering of `text`, or [`INVALID_DATE_LABEL`] if it does not parse.
pub fn display_label(text: &str) -> String {
    parse(text)
        .map(format)
        .unwrap_or_else(|_| INVALID_DATE_LABEL.to_string())
}

/// Index of a three-letter month abbreviation (`"Jan"` = 0). Case-sensitive.
pub fn month_index(abbreviation: &str) -> Option<u32> {
    MONTH_ABBREVIATIONS
        .iter()
        .position(|m| *m == abbreviation)
        .map(|i| i as u32)
}

// "May" is already complete, so it takes no abbreviation period.
fn month_label(month_index: u32) -> String {
    let abbreviation = MONTH_ABBREVIATIONS[month_index as usize % 12];
    if abbreviation == "May" {
        abbreviation.to_string()
    } else {
        format!("{}.", abbreviation)
    }
}

/// `"Jan. 2, 2025"` → (2025, 0, 2). Tokens beyond the third are ignored.
fn parse_current_date(date_part: &str) -> Result<(i32, u32, u32), Unparsable> {
    let malformed = || Unparsable::MalformedDate(date_part.to_string());

    let tokens: Vec<&str> = date_part
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    let [month, day, year, ..] = tokens.as_slice() else {
        return Err(malformed());
    };

    let month = month.replacen('.', "", 1);
    let month_index = month_index(&month).ok_or(Unparsable::UnknownMonth(month))?;
    let day = parse_number(day).ok_or_else(malformed)?;
    let year = parse_year(year).ok_or_else(malformed)?;

    Ok((year, month_index, day))
}

/// `"01/02/2025"` → (2025, 0, 2).
fn parse_legacy_date(date_part: &str) -> Result<(i32, u32, u32), Unparsable> {
    let malformed = || Unparsable::MalformedDate(date_part.to_string());

    let fields: Vec<&str> = date_part.split('/').collect();
    let [month, day, year] = fields.as_slice() else {
        return Err(malformed());
    };

    let month: u32 = parse_number(month).ok_or_else(malformed)?;
    let day = parse_number(day).ok_or_else(malformed)?;
    let year = parse_year(year).ok_or_else(malformed)?;
    let month_index = month
        .checked_sub(1)
        .ok_or_else(|| Unparsable::OutOfRange(date_part.to_string()))?;

    Ok((year, month_index, day))
}

/// `"1:00 PM"` → (13, 0). The AM/PM marker is required and case-insensitive.
fn parse_clock(time_part: &str) -> Result<(u32, u32), Unparsable> {
    let malformed = || Unparsable::MalformedTime(time_part.to_string());

    let (hour, rest) = time_part.trim().split_once(':').ok_or_else(malformed)?;
    let minute_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (minute, marker) = rest.split_at(minute_end);

    let hour: u32 = parse_number(hour).ok_or_else(malformed)?;
    let minute: u32 = parse_number(minute).ok_or_else(malformed)?;
    let marker = marker.trim_start();

    let hour = if marker.eq_ignore_ascii_case("PM") {
        if hour == 12 {
            hour
        } else {
            hour.saturating_add(12)
        }
    } else if marker.eq_ignore_ascii_case("AM") {
        if hour == 12 {
            0
        } else {
            hour
        }
    } else {
        return Err(malformed());
    };

    Ok((hour, minute))
}

/// Unsigned decimal digits only; signs, blanks and trailing junk are rejected.
fn parse_number<T: FromStr>(text: &str) -> Option<T> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Year digits with an optional leading `-`, the form [`format`] writes for years
/// before 1 BCE.
fn parse_year(text: &str) -> Option<i32> {
    match text.strip_prefix('-') {
        Some(digits) => parse_number::<i32>(digits).map(|y| -y),
        None => parse_number(text),
    }
}
