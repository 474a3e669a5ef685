//! Records kept in the send cache for each recipient.
//!
//! Both records are stored as flat field maps. An absent record reads as the
//! zero record, never as an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Field holding the issued code
pub const FIELD_CODE: &str = "code";

/// Field holding the successful-send count
pub const FIELD_NUM: &str = "num";

/// Field holding a unix timestamp (issue time or last send time)
pub const FIELD_TIME: &str = "time";

/// The code most recently issued to a recipient
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRecord {
    /// The issued code, empty when no code is active
    pub code: String,
    /// Unix timestamp (seconds) of issue
    pub issued_at: i64,
}

impl CodeRecord {
    pub fn new(code: impl Into<String>, issued_at: i64) -> Self {
        Self {
            code: code.into(),
            issued_at,
        }
    }

    /// Read a record from its stored field map
    ///
    /// A code of `"0"` is the placeholder some producers write for "no code"
    /// and is read as empty.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let code = fields
            .get(FIELD_CODE)
            .filter(|code| !code.is_empty() && code.as_str() != "0")
            .cloned()
            .unwrap_or_default();

        Self {
            code,
            issued_at: parse_field(fields, FIELD_TIME),
        }
    }

    pub fn to_fields(&self) -> HashMap<String, String> {
        HashMap::from([
            (FIELD_CODE.to_string(), self.code.clone()),
            (FIELD_TIME.to_string(), self.issued_at.to_string()),
        ])
    }

    /// Whether a code is currently held
    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }
}

/// Successful sends to a recipient within the current day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Number of successful sends
    pub count: u32,
    /// Unix timestamp (seconds) of the last successful send
    pub last_sent_at: i64,
}

impl AttemptRecord {
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        Self {
            count: parse_field(fields, FIELD_NUM),
            last_sent_at: parse_field(fields, FIELD_TIME),
        }
    }

    pub fn to_fields(&self) -> HashMap<String, String> {
        HashMap::from([
            (FIELD_NUM.to_string(), self.count.to_string()),
            (FIELD_TIME.to_string(), self.last_sent_at.to_string()),
        ])
    }

    /// Record one more successful send at `now`
    pub fn record_send(&mut self, now: i64) {
        self.count = self.count.saturating_add(1);
        self.last_sent_at = now;
    }

    /// Seconds since the last send; the zero record has never sent
    pub fn elapsed_since_last_send(&self, now: i64) -> i64 {
        now.saturating_sub(self.last_sent_at)
    }
}

fn parse_field<T: std::str::FromStr + Default>(fields: &HashMap<String, String>, name: &str) -> T {
    fields
        .get(name)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or_default()
}
