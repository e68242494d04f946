//! WASM bindings for slot-engine.
//!
//! Exposes slot parsing, availability expansion, booked-slot filtering and
//! booking order to the web front end via `wasm-bindgen`. All complex values
//! are passed as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::Serialize;
use slot_engine::{codec, filter, orderer, BookingRecord, ParsedInstant};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Components of a parsed slot. `month` is zero-based, matching `Date#getMonth`.
#[derive(Serialize)]
struct ParsedSlotDto {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    canonical: String,
}

impl From<ParsedInstant> for ParsedSlotDto {
    fn from(p: ParsedInstant) -> Self {
        Self {
            year: p.year(),
            month: p.month_index(),
            day: p.day(),
            hour: p.hour(),
            minute: p.minute(),
            canonical: codec::format(p),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse the browser's local wall-clock time, e.g. "2025-01-20T10:00:00".
///
/// Seconds are optional. Offsets are not accepted: slot strings carry no zone,
/// so the caller passes its local time.
fn parse_local(s: &str) -> Result<NaiveDateTime, JsValue> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|e| JsValue::from_str(&format!("Invalid datetime '{}': {}", s, e)))
}

fn parse_string_array(json: &str, what: &str) -> Result<Vec<String>, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Parse a slot string in either accepted shape.
///
/// Returns a JSON object `{year, month, day, hour, minute, canonical}`, or
/// throws with the reason the text was rejected.
#[wasm_bindgen(js_name = "parseSlot")]
pub fn parse_slot(text: &str) -> Result<String, JsValue> {
    let parsed = codec::parse(text).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_json(&ParsedSlotDto::from(parsed))
}

/// Display label for a slot string: its canonical form, or "Invalid date".
#[wasm_bindgen(js_name = "formatSlotLabel")]
pub fn format_slot_label(text: &str) -> String {
    codec::display_label(text)
}

/// Expand weekly availability tokens into the open slots left this month.
///
/// # Arguments
/// - `tokens_json` -- JSON array of tokens, e.g. `["Mon-2:00 PM-3:00 PM"]`
/// - `now` -- local wall-clock time ("2025-01-20T10:00[:00]")
/// - `booked_json` -- optional JSON array of slot strings already taken
///
/// Returns a JSON array of slot strings in chronological order.
#[wasm_bindgen(js_name = "expandAvailability")]
pub fn expand_availability(
    tokens_json: &str,
    now: &str,
    booked_json: Option<String>,
) -> Result<String, JsValue> {
    let tokens = parse_string_array(tokens_json, "tokens")?;
    let now = parse_local(now)?;
    let booked: HashSet<String> = match booked_json {
        Some(json) => parse_string_array(&json, "booked slots")?.into_iter().collect(),
        None => HashSet::new(),
    };
    to_json(&filter::available_slots(&tokens, now, &booked))
}

/// Remove booked slots from a candidate list, preserving order.
///
/// Both arguments are JSON arrays of slot strings; matching is exact.
#[wasm_bindgen(js_name = "filterBooked")]
pub fn filter_booked(candidates_json: &str, booked_json: &str) -> Result<String, JsValue> {
    let candidates = parse_string_array(candidates_json, "candidates")?;
    let booked: HashSet<String> = parse_string_array(booked_json, "booked slots")?
        .into_iter()
        .collect();
    to_json(&filter::filter_booked(&candidates, &booked))
}

/// Order a JSON array of booking records by slot time, unreadable slots last.
#[wasm_bindgen(js_name = "orderBookings")]
pub fn order_bookings(records_json: &str) -> Result<String, JsValue> {
    let records: Vec<BookingRecord> = serde_json::from_str(records_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid bookings JSON: {}", e)))?;
    to_json(&orderer::order(records))
}
