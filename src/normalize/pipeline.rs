//! Per-record pipeline and batch execution.
//!
//! `RecordPipeline::process` is the whole core for one record:
//! token normalization → bounds check → reconciliation → classification →
//! closure flag. Every failure becomes a `RejectedRecord`; nothing aborts the
//! batch. Records share no state, so `run_batch` evaluates them in parallel
//! and only collects.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::config::{DecimalRepair, Settings};
use crate::domain::{
    Category, CoordinatePair, CorrectionKind, GeoState, NormalizedRecord, Provenance, RawRecord,
    RejectReason, RejectedRecord,
};
use crate::normalize::bounds::Envelope;
use crate::normalize::classify::CategoryClassifier;
use crate::normalize::reconcile::reconcile;
use crate::normalize::status::StatusFlagger;
use crate::normalize::token::{ParsedToken, TokenError, normalize_token};

/// Exactly one of these per input record.
pub type RecordOutcome = Result<NormalizedRecord, RejectedRecord>;

/// Which field of a `RawRecord` plays which role.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FieldRoles {
    pub latitude: String,
    pub longitude: String,
    pub ownership: Option<String>,
    /// Ownership text for records whose ownership field is absent or blank.
    pub ownership_default: Option<String>,
    pub instrument: Option<String>,
    pub status: Option<String>,
}

impl FieldRoles {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            ..Self::default()
        }
    }

    pub fn with_ownership(mut self, field: impl Into<String>) -> Self {
        self.ownership = Some(field.into());
        self
    }

    pub fn with_ownership_default(mut self, text: impl Into<String>) -> Self {
        self.ownership_default = Some(text.into());
        self
    }

    pub fn with_instrument(mut self, field: impl Into<String>) -> Self {
        self.instrument = Some(field.into());
        self
    }

    pub fn with_status(mut self, field: impl Into<String>) -> Self {
        self.status = Some(field.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct RecordPipeline {
    envelope: Envelope,
    repair: DecimalRepair,
    strategies: Vec<CorrectionKind>,
    classifier: CategoryClassifier,
    flagger: StatusFlagger,
    roles: FieldRoles,
}

impl RecordPipeline {
    pub fn new(settings: &Settings, roles: FieldRoles) -> Self {
        let markers = &settings.markers;
        Self {
            envelope: settings.envelope,
            repair: settings.repair,
            strategies: settings.corrections.clone(),
            classifier: CategoryClassifier::new(&markers.private, &markers.public, &markers.instrument),
            flagger: StatusFlagger::new(&markers.closure),
            roles,
        }
    }

    pub fn roles(&self) -> &FieldRoles {
        &self.roles
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Run one record through the full pipeline.
    pub fn process(&self, record: &RawRecord) -> RecordOutcome {
        let reject = |reason: RejectReason, detail: String| RejectedRecord {
            id: record.id.clone(),
            raw_latitude: record.raw(&self.roles.latitude).map(str::to_string),
            raw_longitude: record.raw(&self.roles.longitude).map(str::to_string),
            reason,
            detail,
        };

        let lat = parse_axis(record, &self.roles.latitude, self.repair.lat_integer_digits)
            .map_err(|e| reject(RejectReason::Unparseable, format!("latitude: {e}")))?;
        let lon = parse_axis(record, &self.roles.longitude, self.repair.lon_integer_digits)
            .map_err(|e| reject(RejectReason::Unparseable, format!("longitude: {e}")))?;

        let pair = CoordinatePair::new(lat.value, lon.value);
        let reconciled = reconcile(pair, &self.envelope, &self.strategies);
        if reconciled.point.state == GeoState::Invalid {
            return Err(reject(
                RejectReason::OutOfBounds,
                format!(
                    "({}, {}) outside envelope lat [{}, {}] lon [{}, {}]",
                    pair.lat,
                    pair.lon,
                    self.envelope.lat_min,
                    self.envelope.lat_max,
                    self.envelope.lon_min,
                    self.envelope.lon_max
                ),
            ));
        }

        let ownership = self
            .roles
            .ownership
            .as_deref()
            .and_then(|f| record.get(f))
            .or(self.roles.ownership_default.as_deref());
        let instrument = self.roles.instrument.as_deref().and_then(|f| record.get(f));
        let category = self
            .classifier
            .classify(ownership, instrument)
            .map_err(|e| reject(RejectReason::AmbiguousCategory, e.to_string()))?;

        let status = self.roles.status.as_deref().and_then(|f| record.get(f));
        let closed = self.flagger.is_closed(status);

        Ok(NormalizedRecord {
            id: record.id.clone(),
            point: reconciled.point,
            category,
            closed,
            provenance: Provenance {
                correction: reconciled.correction,
                lat_repaired: lat.repaired,
                lon_repaired: lon.repaired,
            },
        })
    }

    /// Process every record; outcomes keep the input order.
    pub fn run_batch(&self, records: &[RawRecord]) -> BatchOutcome {
        let outcomes: Vec<RecordOutcome> = records.par_iter().map(|r| self.process(r)).collect();

        for rejected in outcomes.iter().filter_map(|o| o.as_ref().err()) {
            debug!(
                id = %rejected.id,
                reason = %rejected.reason,
                detail = %rejected.detail,
                "record rejected"
            );
        }

        let counts = BatchCounts::tally(&outcomes);
        BatchOutcome { outcomes, counts }
    }

    /// Render a normalized record back into raw form using this pipeline's
    /// column roles and marker tokens.
    ///
    /// Feeding the result to `process` yields the same point (now `Valid`) and
    /// the same category.
    pub fn to_raw_record(&self, record: &NormalizedRecord) -> RawRecord {
        let mut raw = RawRecord::new(record.id.clone())
            .with_field(self.roles.latitude.clone(), record.point.lat.to_string())
            .with_field(self.roles.longitude.clone(), record.point.lon.to_string());

        if let Some(field) = &self.roles.ownership {
            let marker = self
                .classifier
                .ownership_marker(record.category.ownership())
                .unwrap_or_default();
            raw = raw.with_field(field.clone(), marker);
        }
        if let Some(field) = &self.roles.instrument {
            let marker = if record.category.is_ifr() {
                self.classifier.instrument_marker().unwrap_or_default()
            } else {
                ""
            };
            raw = raw.with_field(field.clone(), marker);
        }
        if let Some(field) = &self.roles.status {
            let marker = if record.closed {
                self.flagger.closure_marker().unwrap_or_default()
            } else {
                ""
            };
            raw = raw.with_field(field.clone(), marker);
        }
        raw
    }
}

fn parse_axis(record: &RawRecord, field: &str, integer_digits: usize) -> Result<ParsedToken, TokenError> {
    normalize_token(record.get(field).unwrap_or(""), integer_digits)
}

/// Outcomes of a batch plus aggregate counts.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub outcomes: Vec<RecordOutcome>,
    pub counts: BatchCounts,
}

impl BatchOutcome {
    pub fn normalized(&self) -> impl Iterator<Item = &NormalizedRecord> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn rejected(&self) -> impl Iterator<Item = &RejectedRecord> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    /// Split into the two output sequences.
    pub fn into_parts(self) -> (Vec<NormalizedRecord>, Vec<RejectedRecord>) {
        let mut normalized = Vec::with_capacity(self.counts.normalized);
        let mut rejected = Vec::with_capacity(self.counts.rejected.total());
        for outcome in self.outcomes {
            match outcome {
                Ok(n) => normalized.push(n),
                Err(r) => rejected.push(r),
            }
        }
        (normalized, rejected)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub private: usize,
    pub private_ifr: usize,
    pub public: usize,
    pub public_ifr: usize,
}

impl CategoryCounts {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Private => self.private,
            Category::PrivateIfr => self.private_ifr,
            Category::Public => self.public,
            Category::PublicIfr => self.public_ifr,
        }
    }

    fn bump(&mut self, category: Category) {
        match category {
            Category::Private => self.private += 1,
            Category::PrivateIfr => self.private_ifr += 1,
            Category::Public => self.public += 1,
            Category::PublicIfr => self.public_ifr += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RejectCounts {
    pub unparseable: usize,
    pub out_of_bounds: usize,
    pub ambiguous_category: usize,
}

impl RejectCounts {
    pub fn get(&self, reason: RejectReason) -> usize {
        match reason {
            RejectReason::Unparseable => self.unparseable,
            RejectReason::OutOfBounds => self.out_of_bounds,
            RejectReason::AmbiguousCategory => self.ambiguous_category,
        }
    }

    pub fn total(&self) -> usize {
        self.unparseable + self.out_of_bounds + self.ambiguous_category
    }

    fn bump(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::Unparseable => self.unparseable += 1,
            RejectReason::OutOfBounds => self.out_of_bounds += 1,
            RejectReason::AmbiguousCategory => self.ambiguous_category += 1,
        }
    }
}

/// Aggregate counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    pub total: usize,
    pub normalized: usize,
    /// Normalized without any correction.
    pub valid: usize,
    pub corrected: usize,
    /// Normalized records with at least one decimal-repaired token.
    pub repaired: usize,
    pub closed: usize,
    pub categories: CategoryCounts,
    pub rejected: RejectCounts,
}

impl BatchCounts {
    pub fn tally(outcomes: &[RecordOutcome]) -> Self {
        let mut counts = BatchCounts {
            total: outcomes.len(),
            ..BatchCounts::default()
        };
        for outcome in outcomes {
            match outcome {
                Ok(rec) => {
                    counts.normalized += 1;
                    if rec.provenance.corrected() {
                        counts.corrected += 1;
                    } else {
                        counts.valid += 1;
                    }
                    if rec.provenance.repaired() {
                        counts.repaired += 1;
                    }
                    if rec.closed {
                        counts.closed += 1;
                    }
                    counts.categories.bump(rec.category);
                }
                Err(rej) => counts.rejected.bump(rej.reason),
            }
        }
        counts
    }
}
