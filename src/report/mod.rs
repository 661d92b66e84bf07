//! Formatted terminal reporting.

pub mod format;

pub use format::*;
