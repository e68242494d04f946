//! Weekly availability expansion -- converts recurring availability tokens into
//! concrete slot strings for one calendar month.
//!
//! A tutor's availability is a list of tokens such as `"Mon-2:00 PM-3:00 PM"`.
//! Expansion walks every day of the month containing the reference instant,
//! starting from the reference date, and emits `"<date> - <start time>"` for each
//! token whose weekday matches.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, Weekday};
use tracing::debug;

use crate::codec::{self, SEPARATOR};

/// Separator between the fields of an availability token.
pub const TOKEN_SEPARATOR: char = '-';

/// A parsed weekly availability window, borrowed from its token text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityToken<'a> {
    pub weekday: Weekday,
    /// Start of the window, verbatim from the token (e.g. `"2:00 PM"`).
    pub start: &'a str,
    /// End of the window, when the token carries one.
    pub end: Option<&'a str>,
}

impl<'a> AvailabilityToken<'a> {
    /// Parse `"<Wkd>-<start>[-<end>]"`.
    ///
    /// Returns `None` for tokens that cannot produce a readable slot: an unknown
    /// weekday prefix, or a start time that the codec would reject. Placeholders
    /// such as `"To be determined"` fall in this category.
    pub fn parse(token: &'a str) -> Option<Self> {
        let mut fields = token.split(TOKEN_SEPARATOR);
        let weekday = fields.next().and_then(weekday_from_prefix)?;
        let start = fields.next().map(str::trim).filter(|s| !s.is_empty())?;
        let end = fields.next().map(str::trim).filter(|s| !s.is_empty());

        // Validate against the same grammar used when the slot is read back.
        let sample = format!("Jan. 1, 2000{}{}", SEPARATOR, start);
        codec::parse(&sample).ok()?;

        Some(Self {
            weekday,
            start,
            end,
        })
    }
}

/// Three-letter English abbreviation for a weekday (`"Mon"`, `"Tue"`, ...).
pub fn weekday_abbreviation(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

fn weekday_from_prefix(field: &str) -> Option<Weekday> {
    let field = field.trim();
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .find(|wd| field.starts_with(weekday_abbreviation(*wd)))
}

/// Lazy iterator over the slot strings of one month.
///
/// Clone before consuming, or call [`month_slots`] again, to replay the sequence.
/// The output is deterministic for the same tokens and reference instant.
#[derive(Debug, Clone)]
pub struct MonthSlots<'a> {
    tokens: Vec<AvailabilityToken<'a>>,
    day: Option<NaiveDate>,
    last_day: NaiveDate,
    next_token: usize,
    date_label: String,
}

impl Iterator for MonthSlots<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let day = self.day?;
            if day > self.last_day {
                self.day = None;
                return None;
            }

            while self.next_token < self.tokens.len() {
                let token = self.tokens[self.next_token];
                self.next_token += 1;
                if token.weekday == day.weekday() {
                    if self.date_label.is_empty() {
                        self.date_label = codec::format_date(day);
                    }
                    return Some(format!("{}{}{}", self.date_label, SEPARATOR, token.start));
                }
            }

            self.day = day.succ_opt();
            self.next_token = 0;
            self.date_label.clear();
        }
    }
}

/// Start a lazy expansion of `tokens` over the month containing `reference_now`.
///
/// Days before `reference_now`'s date are skipped; the reference day itself is
/// always included, even if some of its windows have already started. Tokens that
/// do not parse are skipped.
pub fn month_slots<'a, S: AsRef<str>>(
    tokens: &'a [S],
    reference_now: NaiveDateTime,
) -> MonthSlots<'a> {
    let parsed: Vec<AvailabilityToken<'a>> = tokens
        .iter()
        .filter_map(|raw| {
            let raw = raw.as_ref();
            let token = AvailabilityToken::parse(raw);
            if token.is_none() {
                debug!(token = raw, "skipping unreadable availability token");
            }
            token
        })
        .collect();

    let today = reference_now.date();
    MonthSlots {
        tokens: parsed,
        day: Some(today),
        last_day: last_day_of_month(today),
        next_token: 0,
        date_label: String::new(),
    }
}

/// Expand `tokens` into every remaining slot string of `reference_now`'s month.
///
/// Output is in day order, then token order within a day.
pub fn expand<S: AsRef<str>>(tokens: &[S], reference_now: NaiveDateTime) -> Vec<String> {
    month_slots(tokens, reference_now).collect()
}

/// Last calendar day of the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}
