//! Send code configuration module

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Verification code dispatch configuration
///
/// Controls the escalating wait between sends, how long an issued code stays
/// valid and how long a single dispatch may hold the per-recipient lock.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendCodeConfig {
    /// Channel name, used to namespace every cache key (e.g. "sms", "email")
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Successful-send count threshold -> seconds to wait before the next send
    #[serde(default = "default_intervals")]
    pub intervals: BTreeMap<u32, u64>,

    /// Validity window of an issued code in seconds
    #[serde(default = "default_code_expire_seconds")]
    pub code_expire_seconds: u64,

    /// TTL of the per-recipient dispatch lock in seconds
    #[serde(default = "default_lock_seconds")]
    pub lock_seconds: u64,

    /// Track send intervals and issued codes in the cache
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

impl Default for SendCodeConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            intervals: default_intervals(),
            code_expire_seconds: default_code_expire_seconds(),
            lock_seconds: default_lock_seconds(),
            use_cache: default_use_cache(),
        }
    }
}

impl SendCodeConfig {
    /// Create a configuration for the given channel with default timings
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    ///
    /// Absent or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let channel = std::env::var("SEND_CODE_CHANNEL")
            .ok()
            .filter(|channel| !channel.is_empty())
            .unwrap_or(defaults.channel);
        let intervals = std::env::var("SEND_CODE_INTERVALS")
            .ok()
            .and_then(|raw| parse_intervals(&raw))
            .unwrap_or(defaults.intervals);
        let code_expire_seconds = env_parse("SEND_CODE_EXPIRE_SECONDS")
            .unwrap_or(defaults.code_expire_seconds);
        let lock_seconds = env_parse("SEND_CODE_LOCK_SECONDS")
            .unwrap_or(defaults.lock_seconds);
        let use_cache = env_parse("SEND_CODE_USE_CACHE")
            .unwrap_or(defaults.use_cache);

        Self {
            channel,
            intervals,
            code_expire_seconds,
            lock_seconds,
            use_cache,
        }
    }

    /// Replace the escalation table
    pub fn with_intervals(mut self, intervals: BTreeMap<u32, u64>) -> Self {
        self.intervals = intervals;
        self
    }

    /// Set the code validity window in seconds
    pub fn with_expire(mut self, seconds: u64) -> Self {
        self.code_expire_seconds = seconds;
        self
    }

    /// Set the dispatch lock TTL in seconds
    pub fn with_lock(mut self, seconds: u64) -> Self {
        self.lock_seconds = seconds;
        self
    }

    /// Enable or disable interval tracking and code storage
    pub fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Set the channel name
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }
}

/// Parse an escalation table written as `"1:60,2:180,3:600"`
pub fn parse_intervals(raw: &str) -> Option<BTreeMap<u32, u64>> {
    let mut intervals = BTreeMap::new();
    for pair in raw.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
        let (count, seconds) = pair.split_once(':')?;
        intervals.insert(count.trim().parse().ok()?, seconds.trim().parse().ok()?);
    }

    if intervals.is_empty() {
        None
    } else {
        Some(intervals)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|value| value.trim().parse().ok())
}

fn default_channel() -> String {
    String::from("sms")
}

fn default_intervals() -> BTreeMap<u32, u64> {
    BTreeMap::from([(1, 60), (2, 180), (3, 600)])
}

fn default_code_expire_seconds() -> u64 {
    1800 // 30 minutes
}

fn default_lock_seconds() -> u64 {
    5
}

fn default_use_cache() -> bool {
    true
}
