//! Booking records as stored under `bookings/<studentId>/<bookingId>`.
//!
//! Field names follow the stored documents (`teacher`, `time`, `userEmail`, ...);
//! the storage key travels with the record as `studentId` / `bookingId`.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::codec::{self, ParsedInstant};

/// Root of the booking tree in the document store.
pub const BOOKINGS_ROOT: &str = "bookings";

/// Location of a booking: `bookings/<student_id>/<booking_id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BookingKey {
    #[serde(rename = "studentId", default, skip_serializing_if = "String::is_empty")]
    pub student_id: String,
    #[serde(rename = "bookingId", default, skip_serializing_if = "String::is_empty")]
    pub booking_id: String,
}

impl BookingKey {
    pub fn new(student_id: impl Into<String>, booking_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            booking_id: booking_id.into(),
        }
    }

    /// Key for a booking created at `now`: `bookingId_<student>_<timestamp>`, where the
    /// timestamp is ISO 8601 with milliseconds and every non-word character removed
    /// (`2025-01-02T13:00:00.000Z` → `20250102T130000000Z`).
    pub fn generate(student_id: &str, now: DateTime<Utc>) -> Self {
        let stamp: String = now
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        Self::new(student_id, format!("bookingId_{}_{}", student_id, stamp))
    }

    pub fn path(&self) -> String {
        format!("{}/{}/{}", BOOKINGS_ROOT, self.student_id, self.booking_id)
    }

    /// Whether both parts are set. A key with a blank part would address a whole
    /// student node, or the entire booking tree, instead of one booking.
    pub fn is_complete(&self) -> bool {
        !self.student_id.is_empty() && !self.booking_id.is_empty()
    }
}

/// A reservation linking a student, a tutor and one slot string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingRecord {
    #[serde(flatten)]
    pub key: BookingKey,
    #[serde(rename = "teacher")]
    pub tutor: String,
    #[serde(rename = "teacherEmail", skip_serializing_if = "String::is_empty")]
    pub tutor_email: String,
    #[serde(rename = "userEmail")]
    pub student_email: String,
    pub subject: String,
    pub topic: String,
    #[serde(rename = "class", skip_serializing_if = "String::is_empty")]
    pub class_year: String,
    /// The booked slot, verbatim as chosen (current or legacy shape).
    #[serde(rename = "time")]
    pub slot: String,
}

impl BookingRecord {
    pub fn parsed_slot(&self) -> Result<ParsedInstant, codec::Unparsable> {
        codec::parse(&self.slot)
    }
}

/// Upcoming and passed sessions, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSplit {
    pub upcoming: Vec<BookingRecord>,
    pub passed: Vec<BookingRecord>,
}

/// Every slot string booked with `tutor`.
pub fn booked_slots_for(records: &[BookingRecord], tutor: &str) -> HashSet<String> {
    records
        .iter()
        .filter(|r| r.tutor == tutor)
        .map(|r| r.slot.clone())
        .collect()
}

/// Booked slot strings grouped by tutor name.
pub fn booked_slots_by_tutor(records: &[BookingRecord]) -> HashMap<String, HashSet<String>> {
    let mut by_tutor: HashMap<String, HashSet<String>> = HashMap::new();
    for record in records {
        by_tutor
            .entry(record.tutor.clone())
            .or_default()
            .insert(record.slot.clone());
    }
    by_tutor
}

/// Split records into upcoming (slot at or after `now`) and passed sessions.
///
/// Unparsable slots count as passed. Records without a student e-mail are dropped.
pub fn partition_by_time(records: Vec<BookingRecord>, now: NaiveDateTime) -> SessionSplit {
    let now = ParsedInstant::from_naive(now);
    let mut split = SessionSplit::default();
    for record in records {
        if record.student_email.is_empty() {
            continue;
        }
        match record.parsed_slot() {
            Ok(instant) if instant >= now => split.upcoming.push(record),
            _ => split.passed.push(record),
        }
    }
    split
}

/// UTC instant of `slot` in the site timezone, for confirmation messages.
///
/// Falls back to one hour after `now` when the slot cannot be read or names a
/// wall-clock time that does not exist in `tz`.
pub fn confirmation_timestamp(slot: &str, tz: &Tz, now: DateTime<Utc>) -> DateTime<Utc> {
    match codec::parse(slot) {
        Ok(instant) => instant.to_utc(tz).unwrap_or_else(|| {
            warn!(slot, timezone = %tz, "slot falls in a DST gap, using fallback time");
            now + Duration::hours(1)
        }),
        Err(err) => {
            warn!(slot, error = %err, "unreadable slot, using fallback time");
            now + Duration::hours(1)
        }
    }
}
