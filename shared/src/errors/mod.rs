//! Shared error response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response handed to callers of the dispatch service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error name for client identification (e.g. "WAIT_INTERVAL")
    pub error: String,

    /// Numeric error code callers branch on
    pub code: u16,

    /// Human-readable error message
    pub message: String,

    /// Additional error details (remaining wait time, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, code: u16, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }

    /// Look up a detail field, falling back to `default` when it is absent
    pub fn detail_or(&self, key: &str, default: serde_json::Value) -> serde_json::Value {
        self.details
            .as_ref()
            .and_then(|details| details.get(key).cloned())
            .unwrap_or(default)
    }
}

/// Trait for converting errors to ErrorResponse
pub trait IntoErrorResponse {
    fn to_error_response(&self) -> ErrorResponse;
}
