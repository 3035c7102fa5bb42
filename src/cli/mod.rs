//! Command-line parsing for the aerodrome coordinate cleaner.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the normalization code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::io::ingest::{TextEncoding, parse_delimiter};
use crate::logging::{LogFormat, LogLevel};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "aero", version, about = "Aerodrome coordinate cleaner and classifier")]
pub struct Cli {
    /// Settings file (TOML). Falls back to $AERO_CONFIG, then built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level for this crate (ignored when RUST_LOG is set).
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log output format (logs go to stderr).
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Worker threads for record processing (default: one per core).
    #[arg(long, global = true)]
    pub jobs: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clean one CSV or a directory of ANAC CSVs and write the reports.
    Clean(CleanArgs),
    /// Run a single coordinate pair (plus optional attributes) through the pipeline.
    Check(CheckArgs),
    /// Print the effective settings as TOML.
    Config,
}

#[derive(Debug, Args, Clone)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["input", "in_dir"])))]
pub struct CleanArgs {
    /// Input CSV file.
    #[arg(long = "in")]
    pub input: Option<PathBuf>,

    /// Directory of CSV files; only files matching a dataset profile are processed.
    #[arg(long)]
    pub in_dir: Option<PathBuf>,

    /// Output directory (created if missing).
    #[arg(long)]
    pub outdir: PathBuf,

    /// CSV separator (single character or `tab`). Sniffed when omitted; only
    /// honoured with `--in`.
    #[arg(long, value_parser = parse_delimiter)]
    pub sep: Option<u8>,

    /// Input text encoding.
    #[arg(long, value_enum, default_value_t = TextEncoding::Auto)]
    pub encoding: TextEncoding,

    /// Latitude column name (overrides the configured candidates).
    #[arg(long)]
    pub lat_col: Option<String>,

    /// Longitude column name (overrides the configured candidates).
    #[arg(long)]
    pub lon_col: Option<String>,

    /// Identifier column name.
    #[arg(long)]
    pub id_col: Option<String>,

    /// Ownership text for records without an ownership value (e.g. "Privado").
    #[arg(long)]
    pub ownership: Option<String>,

    /// Skip the GeoJSON export.
    #[arg(long)]
    pub no_geojson: bool,

    /// Print the first N rejected records per dataset.
    #[arg(long, default_value_t = 10)]
    pub show_rejected: usize,
}

#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    /// Latitude text, as it would appear in the CSV.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: String,

    /// Longitude text, as it would appear in the CSV.
    #[arg(long, allow_hyphen_values = true)]
    pub lon: String,

    /// Ownership text (e.g. "Público").
    #[arg(long)]
    pub ownership: Option<String>,

    /// Instrument-operations text (e.g. "VFR/IFR").
    #[arg(long)]
    pub instrument: Option<String>,

    /// Status text (e.g. "Interditado").
    #[arg(long)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_requires_an_input() {
        assert!(Cli::try_parse_from(["aero", "clean", "--outdir", "out"]).is_err());
        assert!(Cli::try_parse_from(["aero", "clean", "--in", "a.csv", "--in-dir", "d", "--outdir", "out"]).is_err());
    }

    #[test]
    fn parses_clean_options() {
        let cli = Cli::try_parse_from([
            "aero", "--jobs", "2", "clean", "--in", "a.csv", "--outdir", "out", "--sep", "tab", "--encoding", "latin1",
        ])
        .unwrap();
        assert_eq!(cli.jobs, Some(2));
        let Command::Clean(args) = cli.command else {
            panic!("expected clean");
        };
        assert_eq!(args.sep, Some(b'\t'));
        assert_eq!(args.encoding, TextEncoding::Latin1);
        assert_eq!(args.show_rejected, 10);
    }

    #[test]
    fn log_level_is_validated() {
        let cli = Cli::try_parse_from(["aero", "--log-level", "debug", "config"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert!(Cli::try_parse_from(["aero", "--log-level", "bogus", "config"]).is_err());
    }

    #[test]
    fn check_accepts_negative_values() {
        let cli = Cli::try_parse_from(["aero", "check", "--lat", "-22,9", "--lon", "-43.2"]).unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.lat, "-22,9");
        assert_eq!(args.lon, "-43.2");
    }
}
