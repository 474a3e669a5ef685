//! Per-recipient send throttling and code bookkeeping
//!
//! The tracker owns two keys per recipient (and notification type):
//! - `{channel}:code_cache:{to}[:{type}]` - the issued code, valid for the expire window
//! - `{channel}:num_cache:{to}[:{type}]` - the day's send count, reset at local midnight

use std::sync::Arc;

use chrono::Local;
use sc_shared::recipient::mask_recipient;
use sc_shared::SendCodeConfig;
use tracing::{debug, info, warn};

use crate::domain::entities::{AttemptRecord, CodeRecord};
use crate::errors::{SendCodeError, SendCodeResult};

use super::clock::{seconds_until_next_midnight, Clock, SystemClock};
use super::interval::IntervalTable;
use super::traits::SendCacheStore;

/// Escalating send-interval tracker for one recipient
pub struct ThrottleTracker<S: SendCacheStore + ?Sized> {
    /// Store holding the code and count records
    cache: Arc<S>,
    /// Escalation table
    intervals: IntervalTable,
    /// Code validity window in seconds
    expire_seconds: u64,
    /// Notification type appended to the keys when set
    kind: Option<String>,
    /// Recipient
    to: String,
    /// Time source
    clock: Arc<dyn Clock>,
}

impl<S: SendCacheStore + ?Sized> ThrottleTracker<S> {
    /// Create a tracker for `to` with the default escalation table and validity window
    pub fn new(cache: Arc<S>, to: impl Into<String>) -> Self {
        let defaults = SendCodeConfig::default();
        Self {
            cache,
            intervals: IntervalTable::from(defaults.intervals),
            expire_seconds: defaults.code_expire_seconds,
            kind: None,
            to: to.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a tracker for `to` using the timings from `config`
    pub fn from_config(cache: Arc<S>, config: &SendCodeConfig, to: impl Into<String>) -> Self {
        Self::new(cache, to)
            .interval(IntervalTable::from(config.intervals.clone()))
            .expire(config.code_expire_seconds)
    }

    /// Replace the escalation table
    pub fn interval(mut self, intervals: IntervalTable) -> Self {
        self.intervals = intervals;
        self
    }

    /// Set the code validity window in seconds
    pub fn expire(mut self, seconds: u64) -> Self {
        self.expire_seconds = seconds;
        self
    }

    /// Set the notification type; an empty type is the same as none
    pub fn kind(mut self, kind: Option<&str>) -> Self {
        self.kind = kind.filter(|kind| !kind.is_empty()).map(str::to_string);
        self
    }

    /// Use `clock` as the time source
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn recipient(&self) -> &str {
        &self.to
    }

    /// Check that enough time has passed since the last send
    ///
    /// Fails with `WaitInterval` carrying the remaining seconds. A recipient
    /// with no record always passes.
    pub async fn check_send_allowed(&self) -> SendCodeResult<()> {
        let attempts = self.attempt_record().await?;
        let now = self.clock.now().timestamp();

        let required = self.intervals.interval_for(attempts.count);
        let elapsed = attempts.elapsed_since_last_send(now);

        if required as i64 > elapsed {
            let remaining = (required as i64 - elapsed) as u64;
            warn!(
                to = %mask_recipient(&self.to),
                count = attempts.count,
                remaining,
                event = "code_send_throttled",
                "Send interval not yet elapsed"
            );
            return Err(SendCodeError::wait_interval(self.to.clone(), remaining));
        }

        Ok(())
    }

    /// Record a successful send of `code`
    ///
    /// Stores the code for the validity window, then bumps the send count.
    /// The count record gets its midnight TTL only when this call creates it.
    pub async fn record_send(&self, code: &str) -> SendCodeResult<()> {
        let now = self.clock.now();
        let timestamp = now.timestamp();

        let code_key = self.code_key();
        let record = CodeRecord::new(code, timestamp);
        if self.cache.set(&code_key, &record.to_fields()).await? {
            self.cache.expire(&code_key, self.expire_seconds).await?;
        }

        let num_key = self.num_key();
        let existed = self.cache.exists(&num_key).await?;
        let mut attempts = self.attempt_record().await?;
        attempts.record_send(timestamp);

        if self.cache.set(&num_key, &attempts.to_fields()).await? && !existed {
            let ttl = seconds_until_next_midnight(&now.with_timezone(&Local));
            self.cache.expire(&num_key, ttl).await?;
        }

        debug!(
            to = %mask_recipient(&self.to),
            count = attempts.count,
            "Recorded successful send"
        );

        Ok(())
    }

    /// Seconds the recipient must wait before the next send, given the current count
    pub async fn next_interval(&self) -> SendCodeResult<u64> {
        let attempts = self.attempt_record().await?;
        Ok(self.intervals.interval_for(attempts.count))
    }

    /// Delete the stored code
    ///
    /// Does not compare against any submitted code; call after a successful
    /// [`verify`](Self::verify), or use [`verify_and_consume`](Self::verify_and_consume).
    /// Always returns true.
    pub async fn consume_code(&self) -> SendCodeResult<bool> {
        let key = self.code_key();
        if !self.cache.exists(&key).await? {
            return Ok(true);
        }

        if self.code_record().await?.has_code() {
            self.cache.del(&key).await?;
            info!(
                to = %mask_recipient(&self.to),
                event = "code_consumed",
                "Verification code consumed"
            );
        }

        Ok(true)
    }

    /// Check `code` against the stored code without consuming it
    pub async fn verify(&self, code: &str) -> SendCodeResult<()> {
        let record = self.code_record().await?;

        if !record.has_code() {
            debug!(to = %mask_recipient(&self.to), "No active verification code");
            return Err(SendCodeError::InvalidCode);
        }

        if record.code != code {
            warn!(
                to = %mask_recipient(&self.to),
                event = "code_mismatch",
                "Verification code does not match"
            );
            return Err(SendCodeError::CodeNotCorrect);
        }

        info!(
            to = %mask_recipient(&self.to),
            event = "code_verified",
            "Verification code matched"
        );
        Ok(())
    }

    /// Verify `code` and delete it on success
    ///
    /// A mismatch leaves the stored code in place.
    pub async fn verify_and_consume(&self, code: &str) -> SendCodeResult<()> {
        self.verify(code).await?;
        self.consume_code().await?;
        Ok(())
    }

    /// Current count record; absent reads as zero
    pub async fn attempt_record(&self) -> SendCodeResult<AttemptRecord> {
        let fields = self.cache.get(&self.num_key()).await?;
        Ok(AttemptRecord::from_fields(&fields))
    }

    /// Current code record; absent reads as empty
    pub async fn code_record(&self) -> SendCodeResult<CodeRecord> {
        let fields = self.cache.get(&self.code_key()).await?;
        Ok(CodeRecord::from_fields(&fields))
    }

    /// Key holding the issued code
    pub fn code_key(&self) -> String {
        format!("{}:code_cache:{}", self.cache.name(), self.scope())
    }

    /// Key holding the send count
    pub fn num_key(&self) -> String {
        format!("{}:num_cache:{}", self.cache.name(), self.scope())
    }

    fn scope(&self) -> String {
        match &self.kind {
            Some(kind) => format!("{}:{}", self.to, kind),
            None => self.to.clone(),
        }
    }
}
