//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the explicit run configuration (catalog + paths + API key)
//! - dispatches to the pipeline stages
//! - prints reports

use clap::Parser;

use crate::cli::{CleanArgs, Command, DashArgs, TrendArgs};
use crate::domain::{DataPaths, DateWindow, PipelineConfig, SeriesCatalog};
use crate::error::AppError;
use crate::fit::fit_country_trends;

pub mod pipeline;

/// Entry point for the `cpi` binary.
pub fn run() -> Result<(), AppError> {
    // We want a bare `cpi` (and `cpi -c Sweden`) to behave like `cpi dash ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let config = load_config();

    match cli.command {
        Command::Fetch => handle_fetch(&config),
        Command::Clean(args) => handle_clean(&config, args),
        Command::Batch => handle_batch(&config),
        Command::Merge => handle_merge(&config),
        Command::Trend(args) => handle_trend(&config, args),
        Command::Dash(args) => handle_dash(config, args),
    }
}

/// Build the explicit run configuration.
///
/// The only ambient state read here is the optional `FRED_API_KEY` (via
/// `.env`); everything downstream receives the resulting value.
fn load_config() -> PipelineConfig {
    dotenvy::dotenv().ok();
    PipelineConfig {
        catalog: SeriesCatalog::default(),
        paths: DataPaths::default(),
        api_key: std::env::var("FRED_API_KEY").ok(),
    }
}

fn handle_fetch(config: &PipelineConfig) -> Result<(), AppError> {
    let output = pipeline::fetch_all(config)?;
    println!("{}", crate::report::format_batch_report("Macro fetch", &output.report));
    println!(
        "Wrote {} rows to {}",
        output.rows_written,
        output.out_path.display()
    );
    Ok(())
}

fn handle_clean(config: &PipelineConfig, args: CleanArgs) -> Result<(), AppError> {
    let (cleaned, path) = pipeline::clean_one(
        config,
        &args.series_id,
        args.country.as_deref(),
        args.out.as_deref(),
    )?;
    println!("Saved {} rows to {}", cleaned.rows.len(), path.display());
    Ok(())
}

fn handle_batch(config: &PipelineConfig) -> Result<(), AppError> {
    let report = pipeline::batch_clean(config);
    println!("{}", crate::report::format_batch_report("Batch CPI clean", &report));
    Ok(())
}

fn handle_merge(config: &PipelineConfig) -> Result<(), AppError> {
    let output = pipeline::merge_long(config)?;
    println!("{}", crate::report::format_merge_summary(&output));
    Ok(())
}

fn handle_trend(config: &PipelineConfig, args: TrendArgs) -> Result<(), AppError> {
    let table = pipeline::load_long_table(config)?;

    let Some((min_date, max_date)) = table.date_bounds() else {
        return Err(AppError::new(3, "Merged table is empty. Run `cpi merge` after `cpi batch`."));
    };
    let window = DateWindow {
        start: args.start.unwrap_or(min_date),
        end: args.end.unwrap_or(max_date),
    };

    let countries = if args.countries.is_empty() {
        table.countries()
    } else {
        args.countries
    };

    let trends = fit_country_trends(&table, &countries, window);
    if trends.is_empty() {
        // Explicit "no data" state instead of an empty table.
        println!("No trend data for the selected countries/window.");
        return Ok(());
    }

    println!("{}", crate::report::format_trend_table(&trends, window));
    Ok(())
}

fn handle_dash(config: PipelineConfig, args: DashArgs) -> Result<(), AppError> {
    crate::tui::run(config, args)
}

/// Rewrite argv so `cpi` defaults to `cpi dash`.
///
/// Rules:
/// - `cpi`                      -> `cpi dash`
/// - `cpi -c Sweden ...`        -> `cpi dash -c Sweden ...`
/// - `cpi --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("dash".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "fetch" | "clean" | "batch" | "merge" | "trend" | "dash"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "dash flags".
    if arg1.starts_with('-') {
        argv.insert(1, "dash".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
