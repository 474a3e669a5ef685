//! Domain layer containing the records kept per recipient.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
