//! Trend fitting.
//!
//! One OLS line per country over a date window; both the plotted trend series
//! and the latest-point insight metrics come from that single fit.

pub mod trend;

pub use trend::*;
