//! GeoJSON export of normalized points.
//!
//! A `FeatureCollection` of `Point` features in WGS84 `[lon, lat]` order, the
//! portable hand-off to whatever renders the map.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{Category, NormalizedRecord};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: PointGeometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureProperties {
    pub id: String,
    pub category: Category,
    pub closed: bool,
    pub corrected: bool,
    pub correction: Option<&'static str>,
}

impl From<&NormalizedRecord> for Feature {
    fn from(rec: &NormalizedRecord) -> Self {
        Feature {
            kind: "Feature",
            geometry: PointGeometry {
                kind: "Point",
                coordinates: [rec.longitude(), rec.latitude()],
            },
            properties: FeatureProperties {
                id: rec.id.clone(),
                category: rec.category,
                closed: rec.closed,
                corrected: rec.provenance.corrected(),
                correction: rec.provenance.correction.map(|c| c.label()),
            },
        }
    }
}

pub fn feature_collection<'a, I>(records: I) -> FeatureCollection
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    FeatureCollection {
        kind: "FeatureCollection",
        features: records.into_iter().map(Feature::from).collect(),
    }
}

/// Write a GeoJSON file.
pub fn write_geojson(path: &Path, collection: &FeatureCollection) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create GeoJSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, collection)
        .map_err(|e| AppError::output(format!("Failed to write GeoJSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CoordinatePair, CorrectionKind, GeoPoint, GeoState, Provenance};

    #[test]
    fn features_use_lon_lat_order() {
        let pair = CoordinatePair::from_f64(-22.9, -43.2).unwrap();
        let rec = NormalizedRecord {
            id: "SBRJ".to_string(),
            point: GeoPoint::tagged(pair, GeoState::Corrected),
            category: Category::PublicIfr,
            closed: false,
            provenance: Provenance {
                correction: Some(CorrectionKind::AxisSwap),
                ..Provenance::default()
            },
        };

        let json = serde_json::to_value(feature_collection([&rec])).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        let feature = &json["features"][0];
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["geometry"]["coordinates"][0], -43.2);
        assert_eq!(feature["geometry"]["coordinates"][1], -22.9);
        assert_eq!(feature["properties"]["category"], "public_ifr");
        assert_eq!(feature["properties"]["corrected"], true);
        assert_eq!(feature["properties"]["correction"], "axis_swap");
    }
}
