//! Error types for slot-engine operations.

use thiserror::Error;

/// Why a slot string could not be read as a [`ParsedInstant`](crate::codec::ParsedInstant).
///
/// Returned as a value by [`codec::parse`](crate::codec::parse); parsing never panics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Unparsable {
    #[error("missing date or time part in {0:?}")]
    MissingPart(String),

    #[error("malformed date: {0:?}")]
    MalformedDate(String),

    #[error("unknown month abbreviation: {0:?}")]
    UnknownMonth(String),

    #[error("malformed time: {0:?}")]
    MalformedTime(String),

    #[error("date or time out of calendar range in {0:?}")]
    OutOfRange(String),
}

/// Errors raised by the booking desk and its document store.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid document at {path}: {source}")]
    Document {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unknown tutor {tutor:?} for subject {subject:?}")]
    UnknownTutor { subject: String, tutor: String },

    #[error("Slot {slot:?} is already booked for {tutor:?}")]
    SlotTaken { tutor: String, slot: String },
}

pub type Result<T> = std::result::Result<T, BookingError>;
