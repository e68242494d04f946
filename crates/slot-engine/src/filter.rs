//! Remove booked and elapsed slots from a candidate list.
//!
//! Booked-slot matching is exact string equality. A legacy-shape booking such as
//! `"01/02/2025 - 1:00 PM"` does not block the current-shape candidate
//! `"Jan. 2, 2025 - 1:00 PM"`, even though both name the same minute.

use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::codec::{self, ParsedInstant};
use crate::expander;

/// Keep the candidates whose exact text is not in `booked_for_tutor`.
///
/// Candidate order is preserved.
pub fn filter_booked<S: AsRef<str>>(
    candidates: &[S],
    booked_for_tutor: &HashSet<String>,
) -> Vec<String> {
    candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|slot| !booked_for_tutor.contains(*slot))
        .map(str::to_string)
        .collect()
}

/// Whether `slot` parses and lies strictly before `now`.
///
/// A slot that cannot be read is never considered passed.
pub fn is_passed(slot: &str, now: NaiveDateTime) -> bool {
    codec::parse(slot)
        .map(|instant| instant < ParsedInstant::from_naive(now))
        .unwrap_or(false)
}

/// Drop candidates that have already started at `now`. Unparsable candidates are kept.
pub fn drop_past<S: AsRef<str>>(candidates: &[S], now: NaiveDateTime) -> Vec<String> {
    candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|slot| !is_passed(slot, now))
        .map(str::to_string)
        .collect()
}

/// Expand `tokens` for `reference_now`'s month and remove slots already booked.
pub fn available_slots<S: AsRef<str>>(
    tokens: &[S],
    reference_now: NaiveDateTime,
    booked_for_tutor: &HashSet<String>,
) -> Vec<String> {
    expander::month_slots(tokens, reference_now)
        .filter(|slot| !booked_for_tutor.contains(slot))
        .collect()
}
