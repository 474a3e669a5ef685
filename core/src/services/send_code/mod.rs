//! Verification code dispatch with escalating send intervals
//!
//! This module provides the complete send workflow:
//! - A cache store contract with an atomic lock primitive
//! - Per-recipient send counting with escalating wait intervals
//! - Issued code storage, verification and consumption
//! - A dispatch service that locks, delivers and records each send

mod clock;
mod interval;
mod service;
mod throttle;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use clock::{seconds_until_next_midnight, Clock, SystemClock};
pub use interval::{IntervalTable, DEFAULT_INTERVAL_SECONDS};
pub use service::SendCodeService;
pub use throttle::ThrottleTracker;
pub use traits::{CodeMessage, CodeSender, SendCacheStore, LOCK_SENTINEL};
pub use types::SendCodeRequest;
