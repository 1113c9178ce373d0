//! Terminal reporting.
//!
//! Formatting code lives in one place so:
//! - the transform/fit code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::*;
