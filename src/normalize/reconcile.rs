//! Axis reconciliation: tagging a parsed pair as valid, corrected or invalid.
//!
//! A pair inside the envelope is `Valid` as is. Otherwise each configured
//! correction strategy is tried in order against the *original* pair; the first
//! whose output lands inside the envelope wins and the point is `Corrected`.
//! When none does the point is `Invalid`, carrying the original values.
//!
//! Strategies are pure `(pair) -> Option<pair>` functions so each one can be
//! tested on its own. The default list holds only `AxisSwap`.

use crate::domain::{CoordinatePair, CorrectionKind, GeoPoint, GeoState, NumericCoordinate};
use crate::normalize::bounds::Envelope;

/// Largest power of ten `DecimalShift` will divide by.
const MAX_SHIFT_EXPONENT: i32 = 6;

/// Result of reconciling one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciled {
    pub point: GeoPoint,
    pub correction: Option<CorrectionKind>,
}

impl CorrectionKind {
    /// Propose a corrected pair, or `None` when the strategy does not apply.
    pub fn apply(self, pair: CoordinatePair, envelope: &Envelope) -> Option<CoordinatePair> {
        match self {
            CorrectionKind::AxisSwap => swap_axes(pair),
            CorrectionKind::DecimalShift => shift_decimal(pair, envelope),
        }
    }
}

/// Exchange latitude and longitude.
pub fn swap_axes(pair: CoordinatePair) -> Option<CoordinatePair> {
    Some(CoordinatePair::new(pair.lon, pair.lat))
}

/// Divide each out-of-range axis by the smallest power of ten that brings it
/// inside its range. `None` when some axis cannot be brought in, or when
/// nothing needed shifting.
pub fn shift_decimal(pair: CoordinatePair, envelope: &Envelope) -> Option<CoordinatePair> {
    let lat = shift_axis(pair.lat, |v| envelope.contains_lat(v))?;
    let lon = shift_axis(pair.lon, |v| envelope.contains_lon(v))?;
    let shifted = CoordinatePair::new(lat, lon);
    (shifted != pair).then_some(shifted)
}

fn shift_axis(value: NumericCoordinate, in_range: impl Fn(f64) -> bool) -> Option<NumericCoordinate> {
    if in_range(value.value()) {
        return Some(value);
    }
    (1..=MAX_SHIFT_EXPONENT)
        .map(|p| value.value() / 10f64.powi(p))
        .find(|&v| in_range(v))
        .and_then(NumericCoordinate::new)
}

/// Tag `pair` against `envelope`, trying `strategies` in order when it is outside.
pub fn reconcile(pair: CoordinatePair, envelope: &Envelope, strategies: &[CorrectionKind]) -> Reconciled {
    if envelope.contains(pair) {
        return Reconciled {
            point: GeoPoint::tagged(pair, GeoState::Valid),
            correction: None,
        };
    }

    for &kind in strategies {
        let Some(candidate) = kind.apply(pair, envelope) else {
            continue;
        };
        if envelope.contains(candidate) {
            return Reconciled {
                point: GeoPoint::tagged(candidate, GeoState::Corrected),
                correction: Some(kind),
            };
        }
    }

    Reconciled {
        point: GeoPoint::tagged(pair, GeoState::Invalid),
        correction: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(lat: f64, lon: f64) -> CoordinatePair {
        CoordinatePair::from_f64(lat, lon).unwrap()
    }

    const SWAP_ONLY: &[CorrectionKind] = &[CorrectionKind::AxisSwap];

    #[test]
    fn inside_pair_is_valid_and_untouched() {
        let env = Envelope::default();
        let out = reconcile(pair(-22.9, -43.2), &env, SWAP_ONLY);
        assert_eq!(out.point.state, GeoState::Valid);
        assert_eq!(out.point.pair(), pair(-22.9, -43.2));
        assert_eq!(out.correction, None);
    }

    #[test]
    fn swapped_pair_is_corrected() {
        let env = Envelope::default();
        let out = reconcile(pair(-43.2, -22.9), &env, SWAP_ONLY);
        assert_eq!(out.point.state, GeoState::Corrected);
        assert_eq!(out.point.lat.value(), -22.9);
        assert_eq!(out.point.lon.value(), -43.2);
        assert_eq!(out.correction, Some(CorrectionKind::AxisSwap));
    }

    #[test]
    fn hopeless_pair_is_invalid_with_original_values() {
        let env = Envelope::default();
        let out = reconcile(pair(48.8, 2.35), &env, SWAP_ONLY);
        assert_eq!(out.point.state, GeoState::Invalid);
        assert_eq!(out.point.pair(), pair(48.8, 2.35));
        assert!(!out.point.is_usable());
    }

    #[test]
    fn no_strategies_means_no_correction() {
        let env = Envelope::default();
        let out = reconcile(pair(-43.2, -22.9), &env, &[]);
        assert_eq!(out.point.state, GeoState::Invalid);
    }

    #[test]
    fn decimal_shift_only_runs_when_configured() {
        let env = Envelope::default();
        let lost_point = pair(-229000.0, -43.2);
        assert_eq!(reconcile(lost_point, &env, SWAP_ONLY).point.state, GeoState::Invalid);

        let out = reconcile(
            lost_point,
            &env,
            &[CorrectionKind::AxisSwap, CorrectionKind::DecimalShift],
        );
        assert_eq!(out.point.state, GeoState::Corrected);
        assert_eq!(out.correction, Some(CorrectionKind::DecimalShift));
        assert!((out.point.lat.value() - -22.9).abs() < 1e-9);
        assert_eq!(out.point.lon.value(), -43.2);
    }

    #[test]
    fn strategy_order_decides_the_winner() {
        let env = Envelope::default();
        let out = reconcile(
            pair(-43.2, -22.9),
            &env,
            &[CorrectionKind::DecimalShift, CorrectionKind::AxisSwap],
        );
        // No power of ten moves lon=-22.9 into [-75, -30], so the shift declines.
        assert_eq!(out.correction, Some(CorrectionKind::AxisSwap));
    }

    #[test]
    fn strategies_are_pure_functions() {
        let env = Envelope::default();
        assert_eq!(swap_axes(pair(1.0, 2.0)), Some(pair(2.0, 1.0)));
        assert_eq!(shift_decimal(pair(-22.9, -43.2), &env), None);
        assert_eq!(shift_decimal(pair(-2290.0, -432.0), &env), Some(pair(-22.9, -43.2)));
    }
}
