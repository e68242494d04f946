//! # slot-engine
//!
//! Booking slot resolution for a peer-tutoring site.
//!
//! Tutors publish weekly availability tokens (`"Mon-2:00 PM-3:00 PM"`); students
//! book concrete slot strings (`"Jan. 6, 2025 - 2:00 PM"`). This crate turns the
//! former into the latter for the current month, removes slots that are already
//! booked, and reads, writes and orders slot strings in both the current and the
//! legacy (`"01/06/2025 - 2:00 PM"`) shape.
//!
//! The core functions are pure: the reference time and the booked-slot set are
//! always passed in. [`desk::BookingDesk`] wires them to a [`store::DocumentStore`].
//!
//! ## Modules
//!
//! - [`codec`] — slot string ↔ [`ParsedInstant`]
//! - [`expander`] — availability tokens → slot strings for one month
//! - [`filter`] — drop booked (and optionally elapsed) slots
//! - [`orderer`] — chronological sort of bookings, unreadable slots last
//! - [`booking`] — booking records, keys and grouping helpers
//! - [`store`] — key-path document store seam and in-memory implementation
//! - [`desk`] — availability and booking operations against a store
//! - [`error`] — Error types

pub mod booking;
pub mod codec;
pub mod desk;
pub mod error;
pub mod expander;
pub mod filter;
pub mod orderer;
pub mod store;

pub use booking::{BookingKey, BookingRecord};
pub use codec::{format, parse, ParsedInstant};
pub use desk::{BookingDesk, BookingRequest, DeskConfig, TutorProfile};
pub use error::{BookingError, Unparsable};
pub use expander::expand;
pub use filter::{available_slots, filter_booked};
pub use orderer::order;
pub use store::{DocumentStore, MemoryStore};
