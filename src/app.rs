//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and initializes logging
//! - loads settings
//! - runs the clean workflow per dataset
//! - prints reports and picks the exit code

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, error};

use crate::cli::{CheckArgs, CleanArgs, Cli, Command};
use crate::config::{CONFIG_ENV, Settings};
use crate::error::{AppError, EXIT_NO_RECORDS};
use crate::io::ingest::IngestOptions;
use crate::logging::init_logging;

pub mod pipeline;

/// Entry point for the `aero` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_format);

    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    let settings = Settings::load(config_path.as_deref())?;

    if let Some(jobs) = cli.jobs {
        configure_threads(jobs)?;
    }

    match cli.command {
        Command::Clean(args) => handle_clean(args, &settings),
        Command::Check(args) => handle_check(args, &settings),
        Command::Config => handle_config(&settings),
    }
}

fn configure_threads(jobs: usize) -> Result<(), AppError> {
    if jobs == 0 {
        return Err(AppError::input("--jobs must be at least 1."));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()
        .map_err(|e| AppError::input(format!("Failed to configure worker threads: {e}")))?;
    debug!(jobs, "worker pool configured");
    Ok(())
}

fn handle_clean(args: CleanArgs, settings: &Settings) -> Result<(), AppError> {
    let inputs = pipeline::collect_inputs(args.input.as_deref(), args.in_dir.as_deref(), settings)?;

    let ingest = ingest_options_from_args(&args);
    let output = pipeline::OutputOptions {
        outdir: args.outdir.clone(),
        geojson: !args.no_geojson,
    };
    let run = pipeline::run_clean(&inputs, settings, &ingest, &output)?;

    for ds in &run.datasets {
        println!("{}", crate::report::format_dataset_summary(&ds.summary));
        let table = crate::report::format_rejections(ds.batch.rejected(), args.show_rejected);
        if !table.is_empty() {
            println!("{table}");
        }
    }
    print!(
        "{}",
        crate::report::format_run_footer(&run.summary, &run.summary_path.display().to_string())
    );

    if run.summary.total_normalized() == 0 {
        error!("no dataset produced a normalized record");
        return Err(AppError::new(
            EXIT_NO_RECORDS,
            "No valid records in any dataset; reports were written.",
        ));
    }
    Ok(())
}

pub fn ingest_options_from_args(args: &CleanArgs) -> IngestOptions {
    IngestOptions {
        encoding: args.encoding,
        // A directory mixes exports; each file is sniffed on its own.
        delimiter: if args.input.is_some() { args.sep } else { None },
        lat_col: args.lat_col.clone(),
        lon_col: args.lon_col.clone(),
        id_col: args.id_col.clone(),
        ownership: args.ownership.clone(),
    }
}

fn handle_check(args: CheckArgs, settings: &Settings) -> Result<(), AppError> {
    let input = pipeline::CheckInput {
        lat: args.lat,
        lon: args.lon,
        ownership: args.ownership,
        instrument: args.instrument,
        status: args.status,
    };
    let outcome = pipeline::run_check(settings, &input);
    print!("{}", crate::report::format_check(&outcome));
    Ok(())
}

fn handle_config(settings: &Settings) -> Result<(), AppError> {
    print!("{}", settings.to_toml()?);
    Ok(())
}
