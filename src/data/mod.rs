//! Data acquisition.
//!
//! - `fred`: HTTP client for the FRED observations endpoint plus the
//!   cache-or-fetch boundary every pipeline stage goes through

pub mod fred;

pub use fred::*;
