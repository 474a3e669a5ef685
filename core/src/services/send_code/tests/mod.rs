//! Tests for the send code workflow

mod clock_tests;
mod throttle_tests;
