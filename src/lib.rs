//! `cpi-trends` library crate.
//!
//! The binary (`cpi`) is a thin wrapper around this library so that:
//!
//! - the pipeline stages are testable without spawning processes
//! - modules are reusable (e.g., future GUI/daemon, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod report;
pub mod transform;
pub mod tui;
