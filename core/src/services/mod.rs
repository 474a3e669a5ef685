//! Business services containing the throttling and dispatch logic.

pub mod send_code;

// Re-export commonly used types
pub use send_code::{
    seconds_until_next_midnight, Clock, CodeMessage, CodeSender, IntervalTable, SendCacheStore,
    SendCodeRequest, SendCodeService, SystemClock, ThrottleTracker, LOCK_SENTINEL,
};
