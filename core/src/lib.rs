//! # SendCache Core
//!
//! Core throttling and dispatch logic for single-use verification codes.
//! This crate contains the cache store contract, the escalating send-interval
//! tracker, the dispatch service and the error types callers branch on.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
