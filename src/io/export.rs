//! Export normalized results to CSV and the run summary to JSON.
//!
//! The CSVs are meant to be easy to consume in spreadsheets or GIS tools:
//! - `<stem>_clean.csv`: every input row, original columns first, plus the
//!   pipeline's decision for that row
//! - `<stem>_rejected.csv`: one line per rejected record with its reason

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{RejectReason, RejectedRecord};
use crate::error::AppError;
use crate::io::ingest::Dataset;
use crate::normalize::pipeline::RecordOutcome;
use crate::report::summary::RunSummary;

/// Columns appended to every input row in the clean CSV.
pub const CLEAN_COLUMNS: [&str; 6] = ["LAT_DEC", "LON_DEC", "STATUS", "CATEGORY", "CLOSED", "CORRECTION"];

/// `STATUS` value for normalized rows; rejected rows carry their reason code.
pub const STATUS_OK: &str = "ok";

/// Write the clean CSV. `outcomes` must be parallel to `dataset.rows`.
pub fn write_clean_csv(path: &Path, dataset: &Dataset, outcomes: &[RecordOutcome]) -> Result<(), AppError> {
    if outcomes.len() != dataset.rows.len() {
        return Err(AppError::output(format!(
            "Internal error: {} outcomes for {} rows in '{}'",
            outcomes.len(),
            dataset.rows.len(),
            dataset.path.display()
        )));
    }

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::output(format!("Failed to create clean CSV '{}': {e}", path.display())))?;

    let header = dataset
        .headers
        .iter()
        .map(String::as_str)
        .chain(CLEAN_COLUMNS);
    writer
        .write_record(header)
        .map_err(|e| AppError::output(format!("Failed to write clean CSV header: {e}")))?;

    for (row, outcome) in dataset.rows.iter().zip(outcomes) {
        let extra: [String; 6] = match outcome {
            Ok(rec) => [
                rec.latitude().to_string(),
                rec.longitude().to_string(),
                STATUS_OK.to_string(),
                rec.category.label().to_string(),
                rec.closed.to_string(),
                rec.provenance
                    .correction
                    .map(|c| c.label().to_string())
                    .unwrap_or_default(),
            ],
            Err(rej) => [
                String::new(),
                String::new(),
                rej.reason.code().to_string(),
                String::new(),
                String::new(),
                String::new(),
            ],
        };
        writer
            .write_record(row.values.iter().map(String::as_str).chain(extra.iter().map(String::as_str)))
            .map_err(|e| AppError::output(format!("Failed to write clean CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush clean CSV '{}': {e}", path.display())))?;
    Ok(())
}

#[derive(Serialize)]
struct RejectedRow<'a> {
    id: &'a str,
    reason: RejectReason,
    raw_latitude: Option<&'a str>,
    raw_longitude: Option<&'a str>,
    detail: &'a str,
}

/// Write the rejection report (`id,reason,raw_latitude,raw_longitude,detail`).
///
/// Written even when empty, so a run always leaves an audit file behind.
pub fn write_rejected_csv<'a, I>(path: &Path, rejected: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = &'a RejectedRecord>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| AppError::output(format!("Failed to create rejected CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["id", "reason", "raw_latitude", "raw_longitude", "detail"])
        .map_err(|e| AppError::output(format!("Failed to write rejected CSV header: {e}")))?;

    for r in rejected {
        writer
            .serialize(RejectedRow {
                id: &r.id,
                reason: r.reason,
                raw_latitude: r.raw_latitude.as_deref(),
                raw_longitude: r.raw_longitude.as_deref(),
                detail: &r.detail,
            })
            .map_err(|e| AppError::output(format!("Failed to write rejected CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush rejected CSV '{}': {e}", path.display())))?;
    Ok(())
}

/// Write `summary.json`.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::output(format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldCandidates, Settings};
    use crate::io::ingest::{IngestOptions, parse_text};
    use crate::normalize::pipeline::RecordPipeline;

    fn dataset() -> Dataset {
        let text = "OACI;Latitude;Longitude;Nome\nSBRJ;-43,2;-22,9;Santos Dumont\nXXXX;abc;-43;Nenhum\n";
        let options = IngestOptions {
            ownership: Some("Público".to_string()),
            ..IngestOptions::default()
        };
        parse_text(text, b';', &FieldCandidates::default(), &options, None).unwrap()
    }

    #[test]
    fn clean_csv_keeps_original_columns_and_appends_decisions() {
        let ds = dataset();
        let pipeline = RecordPipeline::new(&Settings::default(), ds.roles.clone());
        let batch = pipeline.run_batch(&ds.records);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a_clean.csv");
        write_clean_csv(&path, &ds, &batch.outcomes).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(
            headers,
            vec![
                "OACI", "Latitude", "Longitude", "Nome", "LAT_DEC", "LON_DEC", "STATUS", "CATEGORY", "CLOSED",
                "CORRECTION"
            ]
        );
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "-43,2");
        assert_eq!(&rows[0][4], "-22.9");
        assert_eq!(&rows[0][5], "-43.2");
        assert_eq!(&rows[0][6], "ok");
        assert_eq!(&rows[0][7], "public");
        assert_eq!(&rows[0][8], "false");
        assert_eq!(&rows[0][9], "axis_swap");
        assert_eq!(&rows[1][6], "unparseable");
        assert_eq!(&rows[1][4], "");
    }

    #[test]
    fn rejected_csv_has_fixed_columns() {
        let rejected = vec![RejectedRecord {
            id: "X".to_string(),
            raw_latitude: Some("48,8".to_string()),
            raw_longitude: None,
            reason: RejectReason::OutOfBounds,
            detail: "outside".to_string(),
        }];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a_rejected.csv");
        write_rejected_csv(&path, &rejected).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("id,reason,raw_latitude,raw_longitude,detail"));
        assert_eq!(lines.next(), Some("X,out_of_bounds,\"48,8\",,outside"));
        assert_eq!(lines.next(), None);

        let empty = dir.path().join("empty_rejected.csv");
        write_rejected_csv(&empty, &Vec::<RejectedRecord>::new()).unwrap();
        assert_eq!(
            std::fs::read_to_string(&empty).unwrap(),
            "id,reason,raw_latitude,raw_longitude,detail\n"
        );
    }

    #[test]
    fn unwritable_output_is_exit_code_4() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.csv");
        let err = write_rejected_csv(&path, &Vec::<RejectedRecord>::new()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
