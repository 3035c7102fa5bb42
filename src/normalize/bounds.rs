//! Geographic envelope and the bounds check.

use serde::{Deserialize, Serialize};

use crate::domain::CoordinatePair;
use crate::error::AppError;

/// Inclusive (min, max) ranges a coordinate must fall in to be accepted.
///
/// Defaults cover mainland Brazil plus its oceanic islands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            lat_min: -35.0,
            lat_max: 6.0,
            lon_min: -75.0,
            lon_max: -30.0,
        }
    }
}

impl Envelope {
    pub fn contains_lat(&self, lat: f64) -> bool {
        self.lat_min <= lat && lat <= self.lat_max
    }

    pub fn contains_lon(&self, lon: f64) -> bool {
        self.lon_min <= lon && lon <= self.lon_max
    }

    /// Both axes inside their ranges. Pure predicate, no correction.
    pub fn contains(&self, pair: CoordinatePair) -> bool {
        self.contains_lat(pair.lat.value()) && self.contains_lon(pair.lon.value())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let all_finite = [self.lat_min, self.lat_max, self.lon_min, self.lon_max]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(AppError::input("Envelope bounds must be finite numbers."));
        }
        if self.lat_min >= self.lat_max {
            return Err(AppError::input(format!(
                "Invalid latitude range: min={} must be below max={}.",
                self.lat_min, self.lat_max
            )));
        }
        if self.lon_min >= self.lon_max {
            return Err(AppError::input(format!(
                "Invalid longitude range: min={} must be below max={}.",
                self.lon_min, self.lon_max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(lat: f64, lon: f64) -> CoordinatePair {
        CoordinatePair::from_f64(lat, lon).unwrap()
    }

    #[test]
    fn default_envelope_accepts_rio() {
        let env = Envelope::default();
        assert!(env.contains(pair(-22.9, -43.2)));
    }

    #[test]
    fn bounds_are_inclusive() {
        let env = Envelope::default();
        assert!(env.contains(pair(-35.0, -75.0)));
        assert!(env.contains(pair(6.0, -30.0)));
        assert!(!env.contains(pair(6.0001, -30.0)));
    }

    #[test]
    fn swapped_pair_is_outside() {
        let env = Envelope::default();
        assert!(!env.contains(pair(-43.2, -22.9)));
    }

    #[test]
    fn validate_rejects_inverted_ranges() {
        let mut env = Envelope::default();
        assert!(env.validate().is_ok());
        env.lat_min = 10.0;
        assert_eq!(env.validate().unwrap_err().exit_code(), 2);
        let env = Envelope {
            lon_max: f64::NAN,
            ..Envelope::default()
        };
        assert!(env.validate().is_err());
    }
}
