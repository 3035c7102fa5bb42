//! Per-dataset workflow shared by every front-end.
//!
//! ingest -> record pipeline -> CSV/GeoJSON exports -> summary
//!
//! The CLI only decides what to print and which exit code to return.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{Settings, match_profile};
use crate::domain::RawRecord;
use crate::error::AppError;
use crate::io::export::{write_clean_csv, write_rejected_csv, write_summary_json};
use crate::io::geojson::{feature_collection, write_geojson};
use crate::io::ingest::{Dataset, IngestOptions, load_dataset};
use crate::normalize::pipeline::{BatchOutcome, FieldRoles, RecordOutcome, RecordPipeline};
use crate::report::summary::{DatasetOutputs, DatasetSummary, RunSummary};

pub const SUMMARY_FILE: &str = "summary.json";

/// Output settings for a `clean` run.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub outdir: PathBuf,
    pub geojson: bool,
}

/// Everything computed for one input file.
#[derive(Debug, Clone)]
pub struct DatasetRun {
    pub dataset: Dataset,
    pub batch: BatchOutcome,
    pub summary: DatasetSummary,
}

/// All outputs of a `clean` run.
#[derive(Debug, Clone)]
pub struct CleanRun {
    pub datasets: Vec<DatasetRun>,
    pub summary: RunSummary,
    pub summary_path: PathBuf,
}

/// Resolve the input list: a single file as given, or every profiled `*.csv`
/// in a directory (sorted by name).
pub fn collect_inputs(input: Option<&Path>, in_dir: Option<&Path>, settings: &Settings) -> Result<Vec<PathBuf>, AppError> {
    if let Some(path) = input {
        if !path.is_file() {
            return Err(AppError::input(format!("Input file not found: {}", path.display())));
        }
        return Ok(vec![path.to_path_buf()]);
    }

    let Some(dir) = in_dir else {
        return Err(AppError::input("Either --in or --in-dir is required."));
    };
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::input(format!("Failed to read input directory '{}': {e}", dir.display())))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();

    let mut inputs = Vec::new();
    for path in files {
        if match_profile(&settings.datasets, &path).is_some() {
            inputs.push(path);
        } else {
            warn!(file = %path.display(), "skipping file with no matching dataset profile");
        }
    }

    if inputs.is_empty() {
        return Err(AppError::input(format!(
            "No input CSV files found in '{}'",
            dir.display()
        )));
    }
    Ok(inputs)
}

/// Load, normalize and export one dataset.
pub fn run_dataset(
    path: &Path,
    settings: &Settings,
    ingest: &IngestOptions,
    output: &OutputOptions,
) -> Result<DatasetRun, AppError> {
    let dataset = load_dataset(path, settings, ingest)?;
    let pipeline = RecordPipeline::new(settings, dataset.roles.clone());
    let batch = pipeline.run_batch(&dataset.records);

    let clean_path = output.outdir.join(format!("{}_clean.csv", dataset.stem));
    let rejected_path = output.outdir.join(format!("{}_rejected.csv", dataset.stem));
    write_clean_csv(&clean_path, &dataset, &batch.outcomes)?;
    write_rejected_csv(&rejected_path, batch.rejected())?;

    let geojson = if !output.geojson {
        None
    } else if batch.counts.normalized == 0 {
        warn!(file = %path.display(), "no normalized records; skipping GeoJSON");
        None
    } else {
        let geo_path = output.outdir.join(format!("{}.geojson", dataset.stem));
        write_geojson(&geo_path, &feature_collection(batch.normalized()))?;
        Some(geo_path.display().to_string())
    };

    let c = &batch.counts;
    info!(
        dataset = %dataset.label(),
        total = c.total,
        normalized = c.normalized,
        valid = c.valid,
        corrected = c.corrected,
        repaired = c.repaired,
        closed = c.closed,
        rejected = c.rejected.total(),
        "dataset processed"
    );

    let outputs = DatasetOutputs {
        clean_csv: clean_path.display().to_string(),
        rejected_csv: rejected_path.display().to_string(),
        geojson,
    };
    let summary = DatasetSummary::new(&dataset, batch.counts, outputs);

    Ok(DatasetRun {
        dataset,
        batch,
        summary,
    })
}

/// Process every input and write `summary.json`.
pub fn run_clean(
    inputs: &[PathBuf],
    settings: &Settings,
    ingest: &IngestOptions,
    output: &OutputOptions,
) -> Result<CleanRun, AppError> {
    fs::create_dir_all(&output.outdir).map_err(|e| {
        AppError::output(format!(
            "Failed to create output directory '{}': {e}",
            output.outdir.display()
        ))
    })?;

    let mut datasets = Vec::with_capacity(inputs.len());
    for path in inputs {
        datasets.push(run_dataset(path, settings, ingest, output)?);
    }

    let summary = RunSummary::new(settings, datasets.iter().map(|d| d.summary.clone()).collect());
    let summary_path = output.outdir.join(SUMMARY_FILE);
    write_summary_json(&summary_path, &summary)?;

    Ok(CleanRun {
        datasets,
        summary,
        summary_path,
    })
}

/// Attribute texts for a single-record check.
#[derive(Debug, Clone, Default)]
pub struct CheckInput {
    pub lat: String,
    pub lon: String,
    pub ownership: Option<String>,
    pub instrument: Option<String>,
    pub status: Option<String>,
}

/// Run one synthetic record through the pipeline.
pub fn run_check(settings: &Settings, input: &CheckInput) -> RecordOutcome {
    let roles = FieldRoles::new("latitude", "longitude")
        .with_ownership("ownership")
        .with_instrument("instrument")
        .with_status("status");

    let mut record = RawRecord::new("check")
        .with_field("latitude", input.lat.as_str())
        .with_field("longitude", input.lon.as_str());
    for (field, value) in [
        ("ownership", &input.ownership),
        ("instrument", &input.instrument),
        ("status", &input.status),
    ] {
        if let Some(value) = value {
            record = record.with_field(field, value.as_str());
        }
    }

    RecordPipeline::new(settings, roles).process(&record)
}
