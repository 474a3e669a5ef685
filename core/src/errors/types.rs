//! Error type definitions for dispatching and verifying codes
//!
//! Every dispatch failure carries a stable numeric code callers branch on.
//! `WaitInterval` additionally carries the remaining wait as structured data.

use sc_shared::{ErrorResponse, IntoErrorResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric error codes exposed to callers
pub mod error_codes {
    pub const PARAMETER_TO_MUST: u16 = 401;
    pub const PARAMETER_CODE_MUST: u16 = 402;
    pub const WAIT_INTERVAL: u16 = 403;
    pub const SEND_FREQUENTLY: u16 = 404;
    pub const SEND_FAILURE: u16 = 405;
    pub const INVALID_CODE: u16 = 410;
    pub const CODE_NOT_CORRECT: u16 = 411;
    pub const CACHE_ERROR: u16 = 500;
}

/// Failure of the backing key-value store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

/// Payload attached to a `WaitInterval` failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitIntervalData {
    /// Recipient that must wait
    pub to: String,
    /// Seconds remaining before the next send is allowed
    pub interval: u64,
}

/// Dispatch and verification errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendCodeError {
    #[error("Sending failed. Parameter to must")]
    MissingRecipient,

    #[error("Sending failed. Parameter code must")]
    MissingCode,

    #[error("Send failed, please try again after {} seconds", .0.interval)]
    WaitInterval(WaitIntervalData),

    #[error("Send frequently, please try again later")]
    SendFrequently,

    #[error("Send failure, please try again later")]
    SendFailure,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("The verification code is not correct")]
    CodeNotCorrect,

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl SendCodeError {
    /// Build a `WaitInterval` error for `to` with `interval` seconds left
    pub fn wait_interval(to: impl Into<String>, interval: u64) -> Self {
        SendCodeError::WaitInterval(WaitIntervalData {
            to: to.into(),
            interval,
        })
    }

    /// Numeric code of this error
    pub fn code(&self) -> u16 {
        match self {
            SendCodeError::MissingRecipient => error_codes::PARAMETER_TO_MUST,
            SendCodeError::MissingCode => error_codes::PARAMETER_CODE_MUST,
            SendCodeError::WaitInterval(_) => error_codes::WAIT_INTERVAL,
            SendCodeError::SendFrequently => error_codes::SEND_FREQUENTLY,
            SendCodeError::SendFailure => error_codes::SEND_FAILURE,
            SendCodeError::InvalidCode => error_codes::INVALID_CODE,
            SendCodeError::CodeNotCorrect => error_codes::CODE_NOT_CORRECT,
            SendCodeError::Cache(_) => error_codes::CACHE_ERROR,
        }
    }

    /// Symbolic name of this error
    pub fn name(&self) -> &'static str {
        match self {
            SendCodeError::MissingRecipient => "PARAMETER_TO_MUST",
            SendCodeError::MissingCode => "PARAMETER_CODE_MUST",
            SendCodeError::WaitInterval(_) => "WAIT_INTERVAL",
            SendCodeError::SendFrequently => "SEND_FREQUENTLY",
            SendCodeError::SendFailure => "SEND_FAILURE",
            SendCodeError::InvalidCode => "INVALID_CODE",
            SendCodeError::CodeNotCorrect => "CODE_NOT_CORRECT",
            SendCodeError::Cache(_) => "CACHE_ERROR",
        }
    }

    /// Structured data attached to the error, if any
    pub fn data(&self) -> Option<&WaitIntervalData> {
        match self {
            SendCodeError::WaitInterval(data) => Some(data),
            _ => None,
        }
    }
}

impl IntoErrorResponse for SendCodeError {
    fn to_error_response(&self) -> ErrorResponse {
        let response = ErrorResponse::new(self.name(), self.code(), self.to_string());
        match self.data() {
            Some(data) => response
                .add_detail("to", &data.to)
                .add_detail("interval", data.interval),
            None => response,
        }
    }
}
