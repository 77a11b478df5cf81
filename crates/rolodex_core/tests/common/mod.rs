#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use rolodex_core::db::open_db_in_memory;
use rolodex_core::{ContactManager, FixedClock, SqliteContactStore};

pub type Book<'conn, 'clock> = ContactManager<SqliteContactStore<'conn>, &'clock FixedClock>;

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .unwrap()
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Fixed "now" shared by the tests: 2024-06-01 12:00.
pub fn now() -> NaiveDateTime {
    at(2024, 6, 1, 12, 0)
}

/// Runs `test` against a fresh in-memory book with Alan (1) and Sarah (2).
pub fn with_book(test: impl FnOnce(&mut Book<'_, '_>, &FixedClock)) {
    let clock = FixedClock::new(now());
    let mut conn = open_db_in_memory().unwrap();
    let store = SqliteContactStore::try_new(&mut conn).unwrap();
    let mut book = ContactManager::load(store, &clock).unwrap();
    book.add_contact("Alan", "nice").unwrap();
    book.add_contact("Sarah", "horrible").unwrap();
    test(&mut book, &clock);
}
