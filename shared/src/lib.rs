//! Shared utilities and common types for SendCache
//!
//! This crate provides common functionality used across all workspace members:
//! - Configuration types
//! - Error response structures
//! - Utility functions (recipient masking, etc.)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{CacheConfig, SendCodeConfig};
pub use errors::{ErrorResponse, IntoErrorResponse};
pub use utils::recipient;
