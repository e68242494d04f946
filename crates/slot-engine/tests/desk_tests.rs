//! Tests for the booking desk against an in-memory document store.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use slot_engine::{
    BookingDesk, BookingError, BookingKey, BookingRequest, DeskConfig, DocumentStore, MemoryStore,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn tree() -> Value {
    json!({
        "teachers": {
            "Algebra": [
                {
                    "name": "Ada",
                    "email": "ada@example.edu",
                    "number": "555-0100",
                    "availableTimes": ["Mon-2:00 PM-3:00 PM", "Wed-4:00 PM-5:00 PM"]
                },
                {
                    "name": "Ben",
                    "email": "ben@example.edu",
                    "number": "555-0101",
                    "availableTimes": ["To be determined"]
                },
                "not a profile"
            ]
        },
        "bookings": {
            "stu1": {
                "b1": {
                    "teacher": "Ada",
                    "userEmail": "sam@example.edu",
                    "subject": "Algebra",
                    "topic": "Limits",
                    "time": "Jan. 20, 2025 - 2:00 PM"
                }
            },
            "stu2": {
                "b2": {
                    "teacher": "Ada",
                    "userEmail": "kim@example.edu",
                    "subject": "Algebra",
                    "topic": "Series",
                    "time": "Jan. 6, 2025 - 2:00 PM"
                },
                "broken": "not a booking"
            },
            "stu3": 5
        }
    })
}

fn desk() -> BookingDesk<MemoryStore> {
    BookingDesk::new(MemoryStore::from_value(tree()), DeskConfig::default())
}

/// Monday 2025-01-20 at 15:00 UTC.
fn monday_afternoon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 20, 15, 0, 0).unwrap()
}

fn request(slot: &str) -> BookingRequest {
    BookingRequest {
        student_id: "stu9".to_string(),
        student_email: "lee@example.edu".to_string(),
        subject: "Algebra".to_string(),
        tutor: "Ada".to_string(),
        slot: slot.to_string(),
        topic: "Matrices".to_string(),
        class_year: "2026".to_string(),
    }
}

// ── Reads ───────────────────────────────────────────────────────────────────

#[test]
fn tutors_skip_malformed_profiles() {
    let desk = desk();
    let tutors = desk.tutors("Algebra").unwrap();
    let names: Vec<&str> = tutors.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Ada", "Ben"]);
    assert_eq!(tutors[0].phone, "555-0100");
    assert!(desk.tutors("Chemistry").unwrap().is_empty());
    assert!(desk.tutor("Algebra", "Cy").unwrap().is_none());
}

#[test]
fn bookings_attach_keys_and_skip_malformed_entries() {
    let desk = desk();
    let mut keys: Vec<String> = desk.bookings().unwrap().iter().map(|r| r.key.path()).collect();
    keys.sort();
    assert_eq!(keys, vec!["bookings/stu1/b1", "bookings/stu2/b2"]);

    let mine = desk.bookings_for_student("stu2").unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].topic, "Series");
}

#[test]
fn ordered_bookings_are_chronological() {
    let topics: Vec<String> = desk()
        .ordered_bookings()
        .unwrap()
        .into_iter()
        .map(|r| r.topic)
        .collect();
    assert_eq!(topics, vec!["Series", "Limits"]);
}

#[test]
fn empty_store_has_no_bookings() {
    let desk = BookingDesk::new(MemoryStore::new(), DeskConfig::default());
    assert!(desk.bookings().unwrap().is_empty());
}

#[test]
fn session_split_uses_desk_clock() {
    let split = desk()
        .session_split(Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap())
        .unwrap();
    assert_eq!(split.passed.len(), 1);
    assert_eq!(split.passed[0].topic, "Series");
    assert_eq!(split.upcoming.len(), 1);
    assert_eq!(split.upcoming[0].topic, "Limits");
}

// ── Availability ────────────────────────────────────────────────────────────

#[test]
fn available_slots_exclude_booked_ones() {
    let desk = desk();
    let ada = desk.tutor("Algebra", "Ada").unwrap().unwrap();
    let slots = desk.available_slots(&ada, monday_afternoon()).unwrap();
    assert_eq!(
        slots,
        vec![
            "Jan. 22, 2025 - 4:00 PM",
            "Jan. 27, 2025 - 2:00 PM",
            "Jan. 29, 2025 - 4:00 PM",
        ]
    );
}

#[test]
fn placeholder_availability_yields_no_slots() {
    let desk = desk();
    let ben = desk.tutor("Algebra", "Ben").unwrap().unwrap();
    assert!(desk.available_slots(&ben, monday_afternoon()).unwrap().is_empty());
}

#[test]
fn elapsed_slots_today_are_kept_unless_configured() {
    let store = MemoryStore::from_value(json!({
        "teachers": {"Algebra": [{"name": "Ada", "availableTimes": ["Mon-2:00 PM-3:00 PM"]}]}
    }));
    let mut desk = BookingDesk::new(store, DeskConfig::default());
    let ada = desk.tutor("Algebra", "Ada").unwrap().unwrap();
    let slots = desk.available_slots(&ada, monday_afternoon()).unwrap();
    assert_eq!(slots.first().map(String::as_str), Some("Jan. 20, 2025 - 2:00 PM"));

    desk = BookingDesk::new(
        desk.into_store(),
        DeskConfig {
            hide_elapsed_slots: true,
            ..DeskConfig::default()
        },
    );
    let slots = desk.available_slots(&ada, monday_afternoon()).unwrap();
    assert_eq!(slots, vec!["Jan. 27, 2025 - 2:00 PM"]);
}

#[test]
fn local_month_follows_configured_timezone() {
    // 03:00 UTC on Feb 1 is still Jan 31 (a Friday) in New York.
    let store = MemoryStore::from_value(json!({
        "teachers": {"Physics": [{"name": "Flo", "availableTimes": ["Fri-5:00 PM-6:00 PM"]}]}
    }));
    let config = DeskConfig {
        timezone: "America/New_York".parse().unwrap(),
        hide_elapsed_slots: false,
    };
    let desk = BookingDesk::new(store, config);
    let flo = desk.tutor("Physics", "Flo").unwrap().unwrap();
    let now = Utc.with_ymd_and_hms(2025, 2, 1, 3, 0, 0).unwrap();
    assert_eq!(
        desk.available_slots(&flo, now).unwrap(),
        vec!["Jan. 31, 2025 - 5:00 PM"]
    );
}

// ── Booking ─────────────────────────────────────────────────────────────────

#[test]
fn booking_writes_record_and_removes_slot() {
    let mut desk = desk();
    let now = monday_afternoon();
    let record = desk.book(request("Jan. 22, 2025 - 4:00 PM"), now).unwrap();

    assert_eq!(record.key, BookingKey::generate("stu9", now));
    assert_eq!(record.tutor_email, "ada@example.edu");

    let stored = desk.store().get(&record.key.path()).unwrap().expect("stored");
    assert_eq!(stored["teacher"], "Ada");
    assert_eq!(stored["time"], "Jan. 22, 2025 - 4:00 PM");
    assert_eq!(stored["class"], "2026");
    assert!(stored.get("bookingId").is_none(), "key is the path, not a field");

    let ada = desk.tutor("Algebra", "Ada").unwrap().unwrap();
    let slots = desk.available_slots(&ada, now).unwrap();
    assert!(!slots.contains(&"Jan. 22, 2025 - 4:00 PM".to_string()));
    assert_eq!(slots.len(), 2);
}

#[test]
fn booking_a_taken_slot_is_rejected() {
    let mut desk = desk();
    let err = desk
        .book(request("Jan. 20, 2025 - 2:00 PM"), monday_afternoon())
        .unwrap_err();
    assert!(matches!(err, BookingError::SlotTaken { ref tutor, .. } if tutor == "Ada"));
    assert_eq!(desk.bookings().unwrap().len(), 2, "nothing written");
}

#[test]
fn booking_requires_every_field() {
    let mut desk = desk();
    let mut req = request("Jan. 22, 2025 - 4:00 PM");
    req.topic = "  ".to_string();
    assert!(matches!(
        desk.book(req, monday_afternoon()),
        Err(BookingError::MissingField("topic"))
    ));
}

#[test]
fn booking_unknown_tutor_is_rejected() {
    let mut desk = desk();
    let mut req = request("Jan. 22, 2025 - 4:00 PM");
    req.tutor = "Cy".to_string();
    assert!(matches!(
        desk.book(req, monday_afternoon()),
        Err(BookingError::UnknownTutor { .. })
    ));
}

#[test]
fn cancel_frees_the_slot() {
    let mut desk = desk();
    desk.cancel(&BookingKey::new("stu1", "b1")).unwrap();
    let ada = desk.tutor("Algebra", "Ada").unwrap().unwrap();
    let slots = desk.available_slots(&ada, monday_afternoon()).unwrap();
    assert_eq!(slots.first().map(String::as_str), Some("Jan. 20, 2025 - 2:00 PM"));

    // Cancelling again is harmless.
    desk.cancel(&BookingKey::new("stu1", "b1")).unwrap();
}

#[test]
fn cancel_rejects_incomplete_key() {
    let mut desk = desk();
    assert!(matches!(
        desk.cancel(&BookingKey::new("stu2", "")),
        Err(BookingError::MissingField(_))
    ));
    assert!(desk.cancel(&BookingKey::default()).is_err());
    assert_eq!(desk.bookings().unwrap().len(), 2, "nothing removed");
}

#[test]
fn tutor_sees_own_bookings_in_order() {
    let mut desk = desk();
    let later = desk
        .book(request("Jan. 29, 2025 - 4:00 PM"), monday_afternoon())
        .unwrap();
    let sooner = desk
        .book(
            request("Jan. 22, 2025 - 4:00 PM"),
            monday_afternoon() + chrono::Duration::minutes(1),
        )
        .unwrap();
    assert_ne!(later.key, sooner.key);

    let slots: Vec<String> = desk
        .bookings_for_tutor_email("ada@example.edu")
        .unwrap()
        .into_iter()
        .map(|r| r.slot)
        .collect();
    assert_eq!(slots, vec!["Jan. 22, 2025 - 4:00 PM", "Jan. 29, 2025 - 4:00 PM"]);

    // Stored records without a tutor e-mail belong to nobody here.
    assert!(desk.bookings_for_tutor_email("").unwrap().is_empty());
    assert!(desk.bookings_for_tutor_email("ben@example.edu").unwrap().is_empty());
}

// ── Profile edits ───────────────────────────────────────────────────────────

#[test]
fn set_availability_replaces_tokens() {
    let mut desk = desk();
    desk.set_availability("Algebra", "Ben", vec!["Tue-1:00 PM-2:00 PM".to_string()])
        .unwrap();
    let ben = desk.tutor("Algebra", "Ben").unwrap().unwrap();
    assert_eq!(ben.available_times, vec!["Tue-1:00 PM-2:00 PM"]);
    assert_eq!(ben.email, "ben@example.edu", "other fields untouched");

    assert!(matches!(
        desk.set_availability("Algebra", "Ben", Vec::new()),
        Err(BookingError::MissingField(_))
    ));
    assert!(matches!(
        desk.set_availability("Algebra", "Cy", vec!["Mon-1:00 PM-2:00 PM".to_string()]),
        Err(BookingError::UnknownTutor { .. })
    ));
}
