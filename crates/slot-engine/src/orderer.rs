//! Chronological ordering of bookings by their slot strings.
//!
//! Records whose slot cannot be parsed go after every readable one. The sort is
//! stable, so unreadable records and records sharing a minute keep input order.

use tracing::debug;

use crate::booking::BookingRecord;
use crate::codec::{self, ParsedInstant};

/// Sort `records` ascending by slot, unreadable slots last.
pub fn order(mut records: Vec<BookingRecord>) -> Vec<BookingRecord> {
    order_by_slot(&mut records, |r| r.slot.as_str());
    records
}

/// Sort any items in place by the slot string `slot_of` extracts.
pub fn order_by_slot<T, F>(items: &mut [T], slot_of: F)
where
    F: Fn(&T) -> &str,
{
    // `sort_by_cached_key` is stable and parses each slot once.
    items.sort_by_cached_key(|item| sort_key(slot_of(item)));
}

/// `None` sorts after `Some` here, the reverse of `Option`'s own ordering.
fn sort_key(slot: &str) -> (bool, Option<ParsedInstant>) {
    match codec::parse(slot) {
        Ok(instant) => (false, Some(instant)),
        Err(err) => {
            debug!(slot, error = %err, "ordering unreadable slot last");
            (true, None)
        }
    }
}
