//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline stays free of presentation concerns
//! - output changes are localized

use crate::domain::{Category, GeoState, RejectReason, RejectedRecord};
use crate::normalize::pipeline::RecordOutcome;
use crate::report::summary::{DatasetSummary, RunSummary};

/// Per-dataset block: counts by state, category and rejection reason.
pub fn format_dataset_summary(summary: &DatasetSummary) -> String {
    let c = &summary.counts;
    let mut out = String::new();

    out.push_str(&format!("=== {} ===\n", summary.label));
    out.push_str(&format!("Source: {}\n", summary.source));
    out.push_str(&format!(
        "Columns: lat='{}' lon='{}' | sep='{}' | encoding={:?}\n",
        summary.lat_column, summary.lon_column, summary.delimiter, summary.encoding
    ));
    out.push_str(&format!(
        "Records: total={} normalized={} (valid={} corrected={} decimal-repaired={}) closed={}\n",
        c.total, c.normalized, c.valid, c.corrected, c.repaired, c.closed
    ));
    if summary.row_errors > 0 {
        out.push_str(&format!("CSV row errors: {}\n", summary.row_errors));
    }

    out.push_str("\nBy category:\n");
    for cat in Category::ALL {
        out.push_str(&format!("  {:<14} {:>7}\n", cat.label(), c.categories.get(cat)));
    }

    out.push_str(&format!("\nRejected: {}\n", c.rejected.total()));
    for reason in RejectReason::ALL {
        out.push_str(&format!("  {:<20} {:>7}\n", reason.code(), c.rejected.get(reason)));
    }

    out.push_str("\nOutputs:\n");
    out.push_str(&format!("- {}\n", summary.outputs.clean_csv));
    out.push_str(&format!("- {}\n", summary.outputs.rejected_csv));
    if let Some(path) = &summary.outputs.geojson {
        out.push_str(&format!("- {path}\n"));
    }

    out
}

/// One-line footer across all datasets.
pub fn format_run_footer(run: &RunSummary, summary_path: &str) -> String {
    let total: usize = run.datasets.iter().map(|d| d.counts.total).sum();
    let rejected: usize = run.datasets.iter().map(|d| d.counts.rejected.total()).sum();
    format!(
        "Datasets: {} | records={} normalized={} rejected={} | summary: {}\n",
        run.datasets.len(),
        total,
        run.total_normalized(),
        rejected,
        summary_path
    )
}

/// Table of the first `limit` rejections.
pub fn format_rejections<'a, I>(rejected: I, limit: usize) -> String
where
    I: IntoIterator<Item = &'a RejectedRecord>,
{
    let mut out = String::new();
    let rows: Vec<&RejectedRecord> = rejected.into_iter().collect();
    if rows.is_empty() || limit == 0 {
        return out;
    }

    out.push_str(&format!("First {} of {} rejected:\n", limit.min(rows.len()), rows.len()));
    out.push_str(
        format!(
            "{:<16} {:<18} {:<14} {:<14} {}\n",
            "id", "reason", "raw_lat", "raw_lon", "detail"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!("{:-<16} {:-<18} {:-<14} {:-<14} {:-<6}\n", "", "", "", "", "")
            .trim_end(),
    );
    out.push('\n');

    for r in rows.iter().take(limit) {
        out.push_str(
            format!(
                "{:<16} {:<18} {:<14} {:<14} {}\n",
                truncate(&r.id, 16),
                r.reason.code(),
                truncate(r.raw_latitude.as_deref().unwrap_or(""), 14),
                truncate(r.raw_longitude.as_deref().unwrap_or(""), 14),
                truncate(&r.detail, 60),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Outcome of a single-record check.
pub fn format_check(outcome: &RecordOutcome) -> String {
    let mut out = String::new();
    match outcome {
        Ok(rec) => {
            let state = match rec.point.state {
                GeoState::Valid => "valid",
                GeoState::Corrected => "corrected",
                GeoState::Invalid => "invalid",
            };
            out.push_str("Result: normalized\n");
            out.push_str(&format!("Point: lat={} lon={}\n", rec.point.lat, rec.point.lon));
            out.push_str(&format!("State: {state}\n"));
            out.push_str(&format!(
                "Correction: {}\n",
                rec.provenance.correction.map(|c| c.label()).unwrap_or("none")
            ));
            let mut repaired = Vec::new();
            if rec.provenance.lat_repaired {
                repaired.push("latitude");
            }
            if rec.provenance.lon_repaired {
                repaired.push("longitude");
            }
            if !repaired.is_empty() {
                out.push_str(&format!("Decimal repaired: {}\n", repaired.join(", ")));
            }
            out.push_str(&format!("Category: {}\n", rec.category));
            out.push_str(&format!("Closed: {}\n", if rec.closed { "yes" } else { "no" }));
        }
        Err(rej) => {
            out.push_str("Result: rejected\n");
            out.push_str(&format!("Reason: {}\n", rej.reason));
            out.push_str(&format!("Detail: {}\n", rej.detail));
        }
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
