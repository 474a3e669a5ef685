//! Time source for send bookkeeping

use chrono::{DateTime, TimeZone, Utc};

const SECONDS_PER_DAY: u64 = 86_400;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Seconds from `now` until the next midnight in `now`'s time zone
///
/// Never returns less than 1. When the next local midnight does not exist
/// (a DST gap starting at 00:00) a full day is returned.
pub fn seconds_until_next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> u64 {
    let tz = now.timezone();
    let next_midnight = now
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| tz.from_local_datetime(&midnight).earliest());

    match next_midnight {
        Some(midnight) => (midnight.timestamp() - now.timestamp()).max(1) as u64,
        None => SECONDS_PER_DAY,
    }
}
