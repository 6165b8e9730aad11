//! # Great-Circle Distance
//!
//! Surface distance between two coordinates using the haversine formula on a
//! spherical Earth. Accurate to about 0.5% against the WGS-84 ellipsoid, which is
//! far below the 10% routing margin applied to the piping length afterwards.

use crate::Coordinate;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between `a` and `b`.
///
/// Total over the whole coordinate domain, symmetric, and zero for identical points.
///
/// # Example
/// ```
/// use solar_pump_lib::{distance::distance, Coordinate};
///
/// let a = Coordinate::new(0.0, 0.0).unwrap();
/// let b = Coordinate::new(0.0, 1.0).unwrap();
/// let d = distance(a, b);
/// assert!((d - 111_194.9).abs() < 1.0);
/// ```
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (dlon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}
