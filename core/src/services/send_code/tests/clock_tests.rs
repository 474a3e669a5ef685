//! Unit tests for the daily reset computation

use chrono::{FixedOffset, TimeZone, Utc};

use crate::services::send_code::seconds_until_next_midnight;

#[test]
fn test_seconds_until_midnight_utc() {
    let now = Utc.with_ymd_and_hms(2024, 5, 20, 23, 0, 0).unwrap();
    assert_eq!(seconds_until_next_midnight(&now), 3600);

    let start_of_day = Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0).unwrap();
    assert_eq!(seconds_until_next_midnight(&start_of_day), 86_400);
}

#[test]
fn test_seconds_until_midnight_follows_offset() {
    // 22:30 in UTC+08:00
    let tz = FixedOffset::east_opt(8 * 3600).unwrap();
    let now = tz.with_ymd_and_hms(2024, 5, 20, 22, 30, 0).unwrap();
    assert_eq!(seconds_until_next_midnight(&now), 5400);

    // Same instant seen from UTC (14:30)
    let same_instant = now.with_timezone(&Utc);
    assert_eq!(seconds_until_next_midnight(&same_instant), 34_200);
}

#[test]
fn test_seconds_until_midnight_never_zero() {
    let tz = FixedOffset::west_opt(5 * 3600).unwrap();
    let now = tz.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
    assert_eq!(seconds_until_next_midnight(&now), 1);
}
