//! Azimuth comparison for navigability decisions
//!
//! Azimuths are compass bearings in degrees (0 = North), taken as the
//! direction of travel when leaving an element through a port. Two ports
//! meeting on a perfectly straight line therefore carry azimuths exactly
//! 180° apart.

/// Maximum deviation from a straight continuation that a train can take,
/// in degrees. Shared by switch resolution and the diamond-crossing tie-break.
pub const NAVIGABILITY_THRESHOLD_DEG: f64 = 30.0;

/// Sentinel deviation used when a candidate path cannot be resolved
pub const UNRESOLVED_DEVIATION_DEG: f64 = 180.0;

/// Wrap an angle to the half-open range (-180, 180]
pub fn normalize_deviation(angle_deg: f64) -> f64 {
    let wrapped = angle_deg.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Signed deviation of the path `a1 -> a2` from a straight continuation
///
/// Returns 0 when the azimuths are exactly opposite, positive when the
/// second azimuth is rotated clockwise past the straight-through bearing.
/// The result lies in (-180, 180] and its absolute value does not depend on
/// argument order.
pub fn deviation_angle(azimuth1: f64, azimuth2: f64) -> f64 {
    normalize_deviation(azimuth2 - azimuth1 - 180.0)
}

/// Whether a train can pass between two ports without an excessive change
/// of direction
pub fn possible_navigability(azimuth1: f64, azimuth2: f64) -> bool {
    possible_navigability_within(azimuth1, azimuth2, NAVIGABILITY_THRESHOLD_DEG)
}

/// Same as [`possible_navigability`] with a caller-supplied threshold
pub fn possible_navigability_within(azimuth1: f64, azimuth2: f64, threshold_deg: f64) -> bool {
    deviation_angle(azimuth1, azimuth2).abs() < threshold_deg
}
