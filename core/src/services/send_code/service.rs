//! Dispatch service implementation

use std::sync::Arc;
use std::time::{Duration, Instant};

use sc_shared::recipient::{mask_recipient, normalize_recipient};
use sc_shared::SendCodeConfig;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::errors::{SendCodeError, SendCodeResult};

use super::clock::{Clock, SystemClock};
use super::interval::IntervalTable;
use super::throttle::ThrottleTracker;
use super::traits::{CodeMessage, CodeSender, SendCacheStore};
use super::types::SendCodeRequest;

/// Dispatch service for verification codes
///
/// One `send` validates the request, checks the recipient's send interval,
/// takes the recipient lock, delivers through the channel, records the send
/// and releases the lock.
pub struct SendCodeService<S: SendCacheStore + ?Sized, H: CodeSender + ?Sized> {
    /// Store for locks and throttle records
    cache: Arc<S>,
    /// Delivery channel
    sender: Arc<H>,
    /// Service configuration
    config: SendCodeConfig,
    /// Escalation table built from the configuration
    intervals: IntervalTable,
    /// Time source shared with the trackers
    clock: Arc<dyn Clock>,
}

impl<S: SendCacheStore + ?Sized, H: CodeSender + ?Sized> SendCodeService<S, H> {
    /// Create a new dispatch service
    ///
    /// # Arguments
    ///
    /// * `cache` - Store backing this channel; its `name` namespaces all keys
    /// * `sender` - Delivery channel implementation
    /// * `config` - Interval, validity and lock settings
    pub fn new(cache: Arc<S>, sender: Arc<H>, config: SendCodeConfig) -> Self {
        let intervals = IntervalTable::from(config.intervals.clone());
        Self {
            cache,
            sender,
            config,
            intervals,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` as the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &SendCodeConfig {
        &self.config
    }

    /// Tracker for `to` with this service's timings and key layout
    ///
    /// Use it to verify or consume codes issued by [`send`](Self::send).
    pub fn tracker(&self, to: &str, kind: Option<&str>) -> ThrottleTracker<S> {
        ThrottleTracker::new(self.cache.clone(), normalize_recipient(to))
            .interval(self.intervals.clone())
            .expire(self.config.code_expire_seconds)
            .kind(kind)
            .clock(self.clock.clone())
    }

    /// Lock key for `to`, shared by every notification type
    pub fn lock_key(&self, to: &str) -> String {
        format!("{}:lock:{}", self.cache.name(), hash_recipient(to))
    }

    /// Send a verification code
    ///
    /// With `debug` set the channel is not called and delivery counts as
    /// successful.
    ///
    /// # Returns
    ///
    /// * `Ok(seconds)` - Seconds until the recipient may be sent another code
    ///   (0 when cache tracking is disabled)
    /// * `Err(SendCodeError)` - Validation, throttling, lock or delivery failure
    pub async fn send(&self, request: &SendCodeRequest, debug: bool) -> SendCodeResult<u64> {
        let (to, code) = Self::validate(request)?;
        let tracker = self.tracker(&to, request.kind.as_deref());

        if self.config.use_cache {
            tracker.check_send_allowed().await?;
        }

        let lock_key = self.lock_key(&to);
        if !self.cache.lock(&lock_key, self.config.lock_seconds).await? {
            warn!(
                to = %mask_recipient(&to),
                event = "code_send_locked",
                "Concurrent send in progress for recipient"
            );
            return Err(SendCodeError::SendFrequently);
        }

        let outcome = self.send_locked(&tracker, &to, &code, request.kind.as_deref(), debug).await;
        self.release(&lock_key).await;

        outcome
    }

    /// Deliver and record while the recipient lock is held
    async fn send_locked(
        &self,
        tracker: &ThrottleTracker<S>,
        to: &str,
        code: &str,
        kind: Option<&str>,
        debug: bool,
    ) -> SendCodeResult<u64> {
        if debug {
            debug!(to = %mask_recipient(to), "Debug send, skipping delivery");
        } else {
            let message = CodeMessage { to, code, kind };
            let started = Instant::now();
            let delivered = self.sender.send_code(&message).await;
            let elapsed = started.elapsed();

            // The lock is not renewed while the channel runs.
            if elapsed > Duration::from_secs(self.config.lock_seconds) {
                warn!(
                    to = %mask_recipient(to),
                    elapsed_ms = elapsed.as_millis() as u64,
                    lock_seconds = self.config.lock_seconds,
                    "Delivery outlived the recipient lock"
                );
            }

            if !delivered {
                error!(
                    to = %mask_recipient(to),
                    event = "code_send_failed",
                    "Delivery channel reported failure"
                );
                return Err(SendCodeError::SendFailure);
            }
        }

        let interval = if self.config.use_cache {
            tracker.record_send(code).await?;
            tracker.next_interval().await?
        } else {
            0
        };

        info!(
            to = %mask_recipient(to),
            interval,
            event = "code_sent",
            "Verification code sent"
        );

        Ok(interval)
    }

    /// Release the recipient lock; a failure only leaves the lock to its TTL
    async fn release(&self, lock_key: &str) {
        if let Err(e) = self.cache.unlock(lock_key).await {
            warn!(
                lock_key,
                error = %e,
                "Failed to release recipient lock, leaving it to expire"
            );
        }
    }

    fn validate(request: &SendCodeRequest) -> SendCodeResult<(String, String)> {
        let to = request
            .to
            .as_deref()
            .map(normalize_recipient)
            .filter(|to| !to.is_empty())
            .ok_or(SendCodeError::MissingRecipient)?;

        let code = request
            .code
            .as_deref()
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .ok_or(SendCodeError::MissingCode)?;

        Ok((to, code))
    }
}

/// SHA-256 hex digest of the recipient
fn hash_recipient(to: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(to.as_bytes());
    format!("{:x}", hasher.finalize())
}
