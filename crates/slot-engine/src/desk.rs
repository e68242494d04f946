//! Booking desk -- the slot core wired to a [`DocumentStore`].
//!
//! Every availability query and every booking re-reads the booking tree first, so
//! the booked-slot set is as fresh as the store allows. There is no transaction
//! between the check and the write: two desks racing for the same slot can both
//! pass the pre-check, and the caller must treat that as possible.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::booking::{self, BookingKey, BookingRecord, SessionSplit, BOOKINGS_ROOT};
use crate::error::{BookingError, Result};
use crate::filter;
use crate::orderer;
use crate::store::DocumentStore;

/// Root of the tutor tree: `teachers/<subject>` holds a list of profiles.
pub const TUTORS_ROOT: &str = "teachers";

/// A tutor as listed under a subject.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorProfile {
    pub name: String,
    pub email: String,
    #[serde(rename = "number")]
    pub phone: String,
    /// Weekly availability tokens, e.g. `"Mon-2:00 PM-3:00 PM"`.
    #[serde(rename = "availableTimes")]
    pub available_times: Vec<String>,
}

/// Desk settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeskConfig {
    /// Timezone slot strings are written in.
    pub timezone: Tz,
    /// Also hide today's slots whose start time has already passed.
    pub hide_elapsed_slots: bool,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            hide_elapsed_slots: false,
        }
    }
}

/// What a student submits to book a session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    pub student_id: String,
    pub student_email: String,
    pub subject: String,
    pub tutor: String,
    pub slot: String,
    pub topic: String,
    pub class_year: String,
}

impl BookingRequest {
    fn validate(&self) -> Result<()> {
        let required = [
            ("student_id", &self.student_id),
            ("subject", &self.subject),
            ("tutor", &self.tutor),
            ("slot", &self.slot),
            ("topic", &self.topic),
            ("class_year", &self.class_year),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(BookingError::MissingField(*field)),
            None => Ok(()),
        }
    }
}

pub struct BookingDesk<S> {
    store: S,
    config: DeskConfig,
}

impl<S: DocumentStore> BookingDesk<S> {
    pub fn new(store: S, config: DeskConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    /// `now` as wall-clock time in the desk's timezone.
    pub fn local_now(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.config.timezone).naive_local()
    }

    /// Tutors offering `subject`, in stored order. Malformed profiles are skipped.
    pub fn tutors(&self, subject: &str) -> Result<Vec<TutorProfile>> {
        Ok(self
            .tutor_entries(subject)?
            .into_iter()
            .map(|(_, profile)| profile)
            .collect())
    }

    pub fn tutor(&self, subject: &str, name: &str) -> Result<Option<TutorProfile>> {
        Ok(self.tutors(subject)?.into_iter().find(|t| t.name == name))
    }

    /// Replace a tutor's weekly availability tokens.
    pub fn set_availability(
        &mut self,
        subject: &str,
        tutor: &str,
        tokens: Vec<String>,
    ) -> Result<()> {
        if tokens.is_empty() {
            return Err(BookingError::MissingField("available_times"));
        }
        let (key, _) = self
            .tutor_entries(subject)?
            .into_iter()
            .find(|(_, profile)| profile.name == tutor)
            .ok_or_else(|| BookingError::UnknownTutor {
                subject: subject.to_string(),
                tutor: tutor.to_string(),
            })?;
        let path = format!("{}/{}/{}/availableTimes", TUTORS_ROOT, subject, key);
        self.store.set(&path, Value::from(tokens))
    }

    /// Every stored booking with its key attached. Malformed entries are skipped.
    pub fn bookings(&self) -> Result<Vec<BookingRecord>> {
        let Some(Value::Object(students)) = self.store.get(BOOKINGS_ROOT)? else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for (student_id, entries) in students {
            let Value::Object(entries) = entries else {
                warn!(student_id = %student_id, "booking node is not an object, skipping");
                continue;
            };
            for (booking_id, doc) in entries {
                let key = BookingKey::new(student_id.clone(), booking_id);
                match serde_json::from_value::<BookingRecord>(doc) {
                    Ok(mut record) => {
                        record.key = key;
                        records.push(record);
                    }
                    Err(err) => warn!(path = %key.path(), error = %err, "skipping malformed booking"),
                }
            }
        }
        Ok(records)
    }

    pub fn bookings_for_student(&self, student_id: &str) -> Result<Vec<BookingRecord>> {
        Ok(self
            .bookings()?
            .into_iter()
            .filter(|r| r.key.student_id == student_id)
            .collect())
    }

    /// Bookings taken with the tutor whose e-mail is `tutor_email`, in
    /// chronological order. This is the tutor's own session list; records without
    /// a tutor e-mail never match.
    pub fn bookings_for_tutor_email(&self, tutor_email: &str) -> Result<Vec<BookingRecord>> {
        Ok(orderer::order(
            self.bookings()?
                .into_iter()
                .filter(|r| !r.tutor_email.is_empty() && r.tutor_email == tutor_email)
                .collect(),
        ))
    }

    /// All bookings in chronological order, unreadable slots last.
    pub fn ordered_bookings(&self) -> Result<Vec<BookingRecord>> {
        Ok(orderer::order(self.bookings()?))
    }

    /// All bookings split into upcoming and passed sessions at `now`.
    pub fn session_split(&self, now: DateTime<Utc>) -> Result<SessionSplit> {
        Ok(booking::partition_by_time(
            self.ordered_bookings()?,
            self.local_now(now),
        ))
    }

    /// Open slots for `tutor` in the current month.
    pub fn available_slots(&self, tutor: &TutorProfile, now: DateTime<Utc>) -> Result<Vec<String>> {
        let booked = booking::booked_slots_for(&self.bookings()?, &tutor.name);
        let local_now = self.local_now(now);
        let slots = filter::available_slots(&tutor.available_times, local_now, &booked);
        let slots = if self.config.hide_elapsed_slots {
            filter::drop_past(&slots, local_now)
        } else {
            slots
        };
        debug!(tutor = %tutor.name, open = slots.len(), booked = booked.len(), "computed availability");
        Ok(slots)
    }

    /// Validate `request`, check the slot is still free, and write the booking.
    pub fn book(&mut self, request: BookingRequest, now: DateTime<Utc>) -> Result<BookingRecord> {
        request.validate()?;

        let tutor = self
            .tutor(&request.subject, &request.tutor)?
            .ok_or_else(|| BookingError::UnknownTutor {
                subject: request.subject.clone(),
                tutor: request.tutor.clone(),
            })?;

        let booked = booking::booked_slots_for(&self.bookings()?, &tutor.name);
        if booked.contains(&request.slot) {
            return Err(BookingError::SlotTaken {
                tutor: tutor.name,
                slot: request.slot,
            });
        }

        let key = BookingKey::generate(&request.student_id, now);
        let record = BookingRecord {
            key: BookingKey::default(),
            tutor: tutor.name,
            tutor_email: tutor.email,
            student_email: request.student_email,
            subject: request.subject,
            topic: request.topic,
            class_year: request.class_year,
            slot: request.slot,
        };

        let path = key.path();
        let doc = serde_json::to_value(&record).map_err(|source| BookingError::Document {
            path: path.clone(),
            source,
        })?;
        self.store.set(&path, doc)?;
        info!(path = %path, tutor = %record.tutor, slot = %record.slot, "booking saved");

        Ok(BookingRecord { key, ..record })
    }

    /// Delete a booking. Removing an absent booking succeeds; a key with a blank
    /// part is rejected.
    pub fn cancel(&mut self, key: &BookingKey) -> Result<()> {
        if !key.is_complete() {
            return Err(BookingError::MissingField("booking key"));
        }
        self.store.remove(&key.path())?;
        info!(path = %key.path(), "booking removed");
        Ok(())
    }

    /// Profiles under `teachers/<subject>` with their child keys. The node may be an
    /// array or, once entries have been removed, an object keyed by index.
    fn tutor_entries(&self, subject: &str) -> Result<Vec<(String, TutorProfile)>> {
        let path = format!("{}/{}", TUTORS_ROOT, subject);
        let entries: Vec<(String, Value)> = match self.store.get(&path)? {
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            Some(Value::Object(map)) => map.into_iter().collect(),
            _ => return Ok(Vec::new()),
        };

        Ok(entries
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .filter_map(|(key, v)| match serde_json::from_value::<TutorProfile>(v) {
                Ok(profile) => Some((key, profile)),
                Err(err) => {
                    warn!(subject, key = %key, error = %err, "skipping malformed tutor profile");
                    None
                }
            })
            .collect())
    }
}
