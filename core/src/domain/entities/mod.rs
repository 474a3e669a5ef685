//! Domain entities stored in the send cache.

pub mod send_record;

// Re-export commonly used types
pub use send_record::{AttemptRecord, CodeRecord};
