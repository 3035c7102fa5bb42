//! Run configuration.
//!
//! Everything the pipeline treats as a parameter lives here: the geographic
//! envelope, digit widths for the missing-decimal repair, marker tokens,
//! correction strategies, column-name candidates and dataset profiles.
//! Defaults describe the Brazilian ANAC aerodrome lists; a TOML file can
//! override any subset of them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::CorrectionKind;
use crate::error::AppError;
use crate::normalize::bounds::Envelope;
use crate::normalize::text::fold;

pub mod datasets;

pub use datasets::*;

/// Environment variable consulted when `--config` is not given.
pub const CONFIG_ENV: &str = "AERO_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Correction strategies, tried in order on out-of-envelope pairs.
    pub corrections: Vec<CorrectionKind>,
    pub envelope: Envelope,
    pub repair: DecimalRepair,
    pub markers: Markers,
    pub fields: FieldCandidates,
    pub datasets: Vec<DatasetProfile>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            corrections: vec![CorrectionKind::AxisSwap],
            envelope: Envelope::default(),
            repair: DecimalRepair::default(),
            markers: Markers::default(),
            fields: FieldCandidates::default(),
            datasets: builtin_profiles(),
        }
    }
}

/// Integer-part width per axis, used to restore a missing decimal point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimalRepair {
    pub lat_integer_digits: usize,
    pub lon_integer_digits: usize,
}

impl Default for DecimalRepair {
    fn default() -> Self {
        Self {
            lat_integer_digits: 2,
            lon_integer_digits: 2,
        }
    }
}

/// Marker tokens, matched as case/accent-insensitive substrings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub private: Vec<String>,
    pub public: Vec<String>,
    pub instrument: Vec<String>,
    pub closure: Vec<String>,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            private: strings(&["privad", "private"]),
            public: strings(&["públic", "public"]),
            instrument: strings(&["ifr"]),
            closure: strings(&["interditad"]),
        }
    }
}

/// Candidate column names per role, compared after name normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldCandidates {
    pub id: Vec<String>,
    pub latitude: Vec<String>,
    pub longitude: Vec<String>,
    pub ownership: Vec<String>,
    pub instrument: Vec<String>,
    pub status: Vec<String>,
}

impl Default for FieldCandidates {
    fn default() -> Self {
        Self {
            id: strings(&["Código OACI", "OACI", "CIAD", "Código", "id"]),
            latitude: strings(&["LatGeoPoint", "Latitude", "Lat", "LatGeo"]),
            longitude: strings(&[
                "LonGeoPoint",
                "LongGeoPoint",
                "Longitude",
                "Lon",
                "Lng",
                "Long",
                "LonGeo",
            ]),
            ownership: strings(&["Propriedade", "Tipo de Propriedade", "Ownership"]),
            instrument: strings(&["Operação Noturna", "Operação IFR", "Instrument", "IFR"]),
            status: strings(&["Situação", "Status"]),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            let settings = Settings::default();
            settings.validate()?;
            return Ok(settings);
        };

        let text = fs::read_to_string(path).map_err(|e| {
            AppError::input(format!("Failed to read config file '{}': {e}", path.display()))
        })?;
        let settings = Self::from_toml(&text)
            .map_err(|e| AppError::input(format!("Invalid config file '{}': {e}", path.display())))?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, AppError> {
        let settings: Settings =
            toml::from_str(text).map_err(|e| AppError::input(format!("TOML error: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, AppError> {
        toml::to_string_pretty(self).map_err(|e| AppError::output(format!("Failed to render settings: {e}")))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.envelope.validate()?;

        if self.repair.lat_integer_digits == 0 || self.repair.lon_integer_digits == 0 {
            return Err(AppError::input("Decimal repair integer widths must be >= 1."));
        }
        if !has_usable_token(&self.markers.private) {
            return Err(AppError::input("At least one private ownership marker is required."));
        }
        if !has_usable_token(&self.markers.public) {
            return Err(AppError::input("At least one public ownership marker is required."));
        }
        if self.fields.latitude.is_empty() || self.fields.longitude.is_empty() {
            return Err(AppError::input("Latitude and longitude column candidates must not be empty."));
        }
        Ok(())
    }
}

fn has_usable_token(tokens: &[String]) -> bool {
    tokens.iter().any(|t| !fold(t).is_empty())
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.corrections, vec![CorrectionKind::AxisSwap]);
        assert_eq!(s.envelope.lat_min, -35.0);
        assert_eq!(s.datasets.len(), 2);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let s = Settings::from_toml(
            r#"
corrections = ["axis_swap", "decimal_shift"]

[envelope]
lat_min = -60.0

[markers]
closure = ["closed", "interditad"]
"#,
        )
        .unwrap();
        assert_eq!(
            s.corrections,
            vec![CorrectionKind::AxisSwap, CorrectionKind::DecimalShift]
        );
        assert_eq!(s.envelope.lat_min, -60.0);
        assert_eq!(s.envelope.lat_max, 6.0);
        assert_eq!(s.markers.closure, vec!["closed", "interditad"]);
        assert_eq!(s.markers.private, Markers::default().private);
    }

    #[test]
    fn invalid_values_are_input_errors() {
        let err = Settings::from_toml("[envelope]\nlat_min = 10.0\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = Settings::from_toml("[markers]\npublic = [\"  \"]\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = Settings::from_toml("[repair]\nlat_integer_digits = 0\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = Settings::from_toml("corrections = [\"guess\"]\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn rendered_toml_loads_back() {
        let s = Settings::default();
        let text = s.to_toml().unwrap();
        assert_eq!(Settings::from_toml(&text).unwrap(), s);
    }
}
