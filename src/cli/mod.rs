//! Command-line parsing for the FRED-based CPI pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the transform/fit code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::Metric;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cpi", version, about = "Quarterly core CPI pipeline and dashboard (FRED-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every catalog series (CPI and GDP) into the raw cache and write
    /// the combined macro table.
    Fetch,
    /// Fetch (or load from cache), clean, and save a single series.
    Clean(CleanArgs),
    /// Clean every CPI series in the catalog, continuing past failures.
    Batch,
    /// Merge cleaned per-country files into the long table, with YoY.
    Merge,
    /// Print the per-country trend insight table (useful for scripting).
    Trend(TrendArgs),
    /// Launch the interactive dashboard.
    ///
    /// This reads the merged long table produced by `cpi merge` and renders it
    /// in a terminal UI using Ratatui.
    Dash(DashArgs),
}

/// Options for cleaning a single series.
#[derive(Debug, Parser, Clone)]
pub struct CleanArgs {
    /// FRED series ID (e.g., NZLCPICORQINMEI).
    pub series_id: String,

    /// Country label for the output file name; omitted means the file is
    /// named after the series id.
    #[arg(long)]
    pub country: Option<String>,

    /// Output folder (default: data/processed).
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

/// Options for the trend insight table.
#[derive(Debug, Parser, Clone)]
pub struct TrendArgs {
    /// Countries to include (repeatable); defaults to every country present.
    #[arg(short = 'c', long = "country")]
    pub countries: Vec<String>,

    /// Window start date (YYYY-MM-DD); defaults to the earliest date present.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Window end date (YYYY-MM-DD); defaults to the latest date present.
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

/// Options for the dashboard.
#[derive(Debug, Parser, Clone)]
pub struct DashArgs {
    /// Countries selected at startup (repeatable); defaults to New Zealand
    /// and United Kingdom when present.
    #[arg(short = 'c', long = "country")]
    pub countries: Vec<String>,

    /// Tab shown at startup.
    #[arg(long, value_enum, default_value = "level")]
    pub metric: Metric,
}
