//! Series normalization stages.
//!
//! Raw heterogeneous series go through three steps before analysis:
//!
//! - `clean`: dedupe dates, drop missing values, rename to `cpi`, persist
//! - `merge`: union the per-country files into one long-format table
//! - `yoy`: append the grouped year-over-year percent-change column

pub mod clean;
pub mod merge;
pub mod yoy;

pub use clean::*;
pub use merge::*;
pub use yoy::*;
