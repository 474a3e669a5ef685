//! Common utility functions

pub mod recipient;

pub use recipient::*;
