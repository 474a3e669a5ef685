//! Configuration module
//!
//! - `cache` - Redis connection and key layout
//! - `send_code` - Send interval escalation, code validity and lock timing

pub mod cache;
pub mod send_code;

pub use cache::CacheConfig;
pub use send_code::SendCodeConfig;
