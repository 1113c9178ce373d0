//! Numerical helpers.
//!
//! - `ols`: the least-squares solver behind the per-country trend fit

pub mod ols;

pub use ols::*;
