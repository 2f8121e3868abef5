//! Integration tests for recurring-event persistence over an on-disk
//! database.

use busybee_core::{Frequency, NewEvent, RecurrenceRule, ScheduleStore};
use chrono::{NaiveDate, NaiveDateTime};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

#[test]
fn recurring_series_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("busybee.db");

    let ids = {
        let store = ScheduleStore::open(&db_path).unwrap();
        store
            .save_recurring_event(&NewEvent {
                name: "Rent due".to_string(),
                notes: Some("transfer before noon".to_string()),
                place: None,
                start: at(2024, 1, 31, 9, 0),
                repeat: Some(RecurrenceRule {
                    frequency: Frequency::Monthly,
                    times: 3,
                }),
            })
            .unwrap()
    };
    assert_eq!(ids.len(), 3);

    let store = ScheduleStore::open(&db_path).unwrap();
    let first = store.get_event(&ids[0]).unwrap().unwrap();
    let recurrence_id = first.recurrence_id.unwrap();
    let series = store.events_for_recurrence(&recurrence_id).unwrap();

    // Month-end clamp carried from the previous occurrence (2024 is leap).
    let starts: Vec<NaiveDateTime> = series.iter().map(|e| e.start).collect();
    assert_eq!(
        starts,
        vec![at(2024, 1, 31, 9, 0), at(2024, 2, 29, 9, 0), at(2024, 3, 29, 9, 0)]
    );
    assert!(series.iter().all(|e| e.name == "Rent due"));

    let rule = store.get_recurrence(&recurrence_id).unwrap().unwrap();
    assert_eq!(rule.frequency, Frequency::Monthly);
    assert_eq!(rule.times, 3);
}

#[test]
fn month_listing_sees_each_occurrence_separately() {
    let dir = tempfile::tempdir().unwrap();
    let store = ScheduleStore::open(dir.path().join("busybee.db")).unwrap();

    store
        .save_recurring_event(&NewEvent {
            name: "Book club".to_string(),
            notes: None,
            place: Some("Library".to_string()),
            start: at(2024, 3, 25, 19, 0),
            repeat: Some(RecurrenceRule {
                frequency: Frequency::Weekly,
                times: 4,
            }),
        })
        .unwrap();

    let march = store.list_events_for_month(2024, 3).unwrap();
    let april = store.list_events_for_month(2024, 4).unwrap();
    assert_eq!(march.len(), 1);
    assert_eq!(april.len(), 3);
    assert_eq!(april[0].start, at(2024, 4, 1, 19, 0));

    let day = store
        .list_events_for_day(NaiveDate::from_ymd_opt(2024, 4, 8).unwrap())
        .unwrap();
    assert_eq!(day.len(), 1);
    assert_eq!(day[0].place.as_deref(), Some("Library"));
}

#[test]
fn deleting_every_occurrence_leaves_the_recurrence_row() {
    let dir = tempfile::tempdir().unwrap();
    let store = ScheduleStore::open(dir.path().join("busybee.db")).unwrap();

    let ids = store
        .save_recurring_event(&NewEvent {
            name: "Daily walk".to_string(),
            notes: None,
            place: None,
            start: at(2024, 6, 1, 7, 0),
            repeat: Some(RecurrenceRule {
                frequency: Frequency::Daily,
                times: 2,
            }),
        })
        .unwrap();
    let recurrence_id = store
        .get_event(&ids[0])
        .unwrap()
        .unwrap()
        .recurrence_id
        .unwrap();

    for id in &ids {
        store.delete_item(id).unwrap();
    }
    assert!(store.events_for_recurrence(&recurrence_id).unwrap().is_empty());
    assert!(store.get_recurrence(&recurrence_id).unwrap().is_some());
}
