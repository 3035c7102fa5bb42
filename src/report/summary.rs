//! Run summary model, shared by the terminal report and `summary.json`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Settings;
use crate::domain::CorrectionKind;
use crate::io::ingest::{Dataset, TextEncoding};
use crate::normalize::bounds::Envelope;
use crate::normalize::pipeline::BatchCounts;

/// Files written for one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetOutputs {
    pub clean_csv: String,
    pub rejected_csv: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geojson: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    /// Matched profile key, if any.
    pub profile: Option<String>,
    pub label: String,
    pub source: String,
    pub encoding: TextEncoding,
    pub delimiter: String,
    pub lat_column: String,
    pub lon_column: String,
    pub row_errors: usize,
    pub counts: BatchCounts,
    pub outputs: DatasetOutputs,
}

impl DatasetSummary {
    pub fn new(dataset: &Dataset, counts: BatchCounts, outputs: DatasetOutputs) -> Self {
        Self {
            profile: dataset.profile.as_ref().map(|p| p.key.clone()),
            label: dataset.label().to_string(),
            source: dataset.path.display().to_string(),
            encoding: dataset.encoding,
            delimiter: char::from(dataset.delimiter).escape_default().to_string(),
            lat_column: dataset.roles.latitude.clone(),
            lon_column: dataset.roles.longitude.clone(),
            row_errors: dataset.row_errors.len(),
            counts,
            outputs,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub envelope: Envelope,
    pub corrections: Vec<CorrectionKind>,
    pub datasets: Vec<DatasetSummary>,
}

impl RunSummary {
    pub fn new(settings: &Settings, datasets: Vec<DatasetSummary>) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            envelope: settings.envelope,
            corrections: settings.corrections.clone(),
            datasets,
        }
    }

    pub fn total_normalized(&self) -> usize {
        self.datasets.iter().map(|d| d.counts.normalized).sum()
    }
}

