//! Input/output helpers for the flat CSV artifacts.
//!
//! - raw cache files, one per FRED series id (`raw`)
//! - cleaned per-country files (`cleaned`)
//! - the merged long-format tables (`long`)

pub mod cleaned;
pub mod long;
pub mod raw;

pub use cleaned::*;
pub use long::*;
pub use raw::*;
