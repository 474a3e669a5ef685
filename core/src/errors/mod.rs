//! Error types surfaced by the send cache and the dispatch service.

mod types;

#[cfg(test)]
mod tests;

// Re-export all error types
pub use types::{error_codes, CacheError, SendCodeError, WaitIntervalData};

/// Result type for cache store operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Result type for dispatch and verification operations
pub type SendCodeResult<T> = Result<T, SendCodeError>;
