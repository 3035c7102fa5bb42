//! Shared domain types.
//!
//! A `RawRecord` goes in, and exactly one of `NormalizedRecord` or
//! `RejectedRecord` comes out. The output types are plain values: once the
//! pipeline produces them nothing mutates them again, they are only serialized
//! or rendered.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A record as handed over by the CSV collaborator.
///
/// Field names are whatever the source file uses; the pipeline looks fields up
/// through the configured column roles rather than fixed names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub id: String,
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: HashMap::new(),
        }
    }

    /// Builder-style field insertion (handy for tests and re-ingest).
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Raw text of a field, untouched.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Trimmed, non-empty text of a field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.raw(name).map(str::trim).filter(|s| !s.is_empty())
    }
}

/// A finite signed decimal produced by the token normalizer.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct NumericCoordinate(f64);

impl NumericCoordinate {
    /// `None` for NaN and infinities.
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for NumericCoordinate {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("non-finite coordinate: {value}"))
    }
}

impl From<NumericCoordinate> for f64 {
    fn from(value: NumericCoordinate) -> Self {
        value.0
    }
}

impl fmt::Display for NumericCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A parsed (latitude, longitude) pair before any validity decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatePair {
    pub lat: NumericCoordinate,
    pub lon: NumericCoordinate,
}

impl CoordinatePair {
    pub fn new(lat: NumericCoordinate, lon: NumericCoordinate) -> Self {
        Self { lat, lon }
    }

    /// Convenience for literals; `None` when either value is non-finite.
    pub fn from_f64(lat: f64, lon: f64) -> Option<Self> {
        Some(Self::new(NumericCoordinate::new(lat)?, NumericCoordinate::new(lon)?))
    }
}

/// Validity tag of a `GeoPoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoState {
    /// Inside the envelope as parsed.
    Valid,
    /// Inside the envelope after a correction strategy.
    Corrected,
    /// Outside the envelope even after every configured strategy.
    Invalid,
}

/// A coordinate pair tagged with its validity.
///
/// Only the axis reconciler builds these, so `Valid` and `Corrected` points are
/// always inside the envelope they were checked against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: NumericCoordinate,
    pub lon: NumericCoordinate,
    pub state: GeoState,
}

impl GeoPoint {
    pub(crate) fn tagged(pair: CoordinatePair, state: GeoState) -> Self {
        Self {
            lat: pair.lat,
            lon: pair.lon,
            state,
        }
    }

    pub fn pair(&self) -> CoordinatePair {
        CoordinatePair::new(self.lat, self.lon)
    }

    pub fn is_usable(&self) -> bool {
        matches!(self.state, GeoState::Valid | GeoState::Corrected)
    }
}

/// Correction strategies the reconciler can apply, in the order configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionKind {
    /// Exchange latitude and longitude.
    AxisSwap,
    /// Divide out-of-range axes by a power of ten.
    DecimalShift,
}

impl CorrectionKind {
    pub fn label(self) -> &'static str {
        match self {
            CorrectionKind::AxisSwap => "axis_swap",
            CorrectionKind::DecimalShift => "decimal_shift",
        }
    }
}

/// Operational category of an aerodrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Private,
    PrivateIfr,
    Public,
    PublicIfr,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Private,
        Category::PrivateIfr,
        Category::Public,
        Category::PublicIfr,
    ];

    pub fn from_parts(ownership: Ownership, ifr: bool) -> Self {
        match (ownership, ifr) {
            (Ownership::Private, false) => Category::Private,
            (Ownership::Private, true) => Category::PrivateIfr,
            (Ownership::Public, false) => Category::Public,
            (Ownership::Public, true) => Category::PublicIfr,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Private => "private",
            Category::PrivateIfr => "private_ifr",
            Category::Public => "public",
            Category::PublicIfr => "public_ifr",
        }
    }

    pub fn ownership(self) -> Ownership {
        match self {
            Category::Private | Category::PrivateIfr => Ownership::Private,
            Category::Public | Category::PublicIfr => Ownership::Public,
        }
    }

    pub fn is_ifr(self) -> bool {
        matches!(self, Category::PrivateIfr | Category::PublicIfr)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ownership side of the category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    Private,
    Public,
}

/// How a normalized record's coordinates were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Provenance {
    /// Strategy that moved the pair into the envelope, if any.
    pub correction: Option<CorrectionKind>,
    /// The latitude token had its missing decimal point restored.
    pub lat_repaired: bool,
    /// The longitude token had its missing decimal point restored.
    pub lon_repaired: bool,
}

impl Provenance {
    pub fn corrected(&self) -> bool {
        self.correction.is_some()
    }

    pub fn repaired(&self) -> bool {
        self.lat_repaired || self.lon_repaired
    }
}

/// A successfully processed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub id: String,
    pub point: GeoPoint,
    pub category: Category,
    pub closed: bool,
    pub provenance: Provenance,
}

impl NormalizedRecord {
    pub fn latitude(&self) -> f64 {
        self.point.lat.value()
    }

    pub fn longitude(&self) -> f64 {
        self.point.lon.value()
    }
}

/// Why a record was left out of the normalized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Unparseable,
    OutOfBounds,
    AmbiguousCategory,
}

impl RejectReason {
    pub const ALL: [RejectReason; 3] = [
        RejectReason::Unparseable,
        RejectReason::OutOfBounds,
        RejectReason::AmbiguousCategory,
    ];

    pub fn code(self) -> &'static str {
        match self {
            RejectReason::Unparseable => "unparseable",
            RejectReason::OutOfBounds => "out_of_bounds",
            RejectReason::AmbiguousCategory => "ambiguous_category",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A record removed from the normalized output, kept for the audit report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub id: String,
    pub raw_latitude: Option<String>,
    pub raw_longitude: Option<String>,
    pub reason: RejectReason,
    /// Human-readable explanation (which axis, which markers, ...).
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coordinate_rejects_non_finite() {
        assert!(NumericCoordinate::new(f64::NAN).is_none());
        assert!(NumericCoordinate::new(f64::INFINITY).is_none());
        assert_eq!(NumericCoordinate::new(-22.5).map(|c| c.value()), Some(-22.5));
    }

    #[test]
    fn category_table_is_total() {
        assert_eq!(Category::from_parts(Ownership::Private, false), Category::Private);
        assert_eq!(Category::from_parts(Ownership::Private, true), Category::PrivateIfr);
        assert_eq!(Category::from_parts(Ownership::Public, false), Category::Public);
        assert_eq!(Category::from_parts(Ownership::Public, true), Category::PublicIfr);
        for c in Category::ALL {
            assert_eq!(Category::from_parts(c.ownership(), c.is_ifr()), c);
        }
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_string(&Category::PublicIfr).unwrap();
        assert_eq!(json, "\"public_ifr\"");
    }

    #[test]
    fn raw_record_get_trims_and_skips_blank() {
        let rec = RawRecord::new("X")
            .with_field("lat", "  -22.1 ")
            .with_field("empty", "   ");
        assert_eq!(rec.get("lat"), Some("-22.1"));
        assert_eq!(rec.get("empty"), None);
        assert_eq!(rec.get("missing"), None);
        assert_eq!(rec.raw("empty"), Some("   "));
    }
}
