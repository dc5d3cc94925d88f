//! Spherical-Earth geodesy and camera interpolation
//!
//! Forward great-circle projection on a sphere of radius `EARTH_RADIUS_M`.
//! Longitudes are returned as computed, without wrapping into [-180, 180].

use crate::core_types::GeoPoint;

/// Mean Earth radius (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Destination reached from `origin` after `distance_m` along `bearing_deg`
///
/// Bearing is a compass bearing: 0 = north, increasing clockwise. A negative
/// distance is accepted and mirrors the projection (equivalent to bearing + 180°).
///
/// # Arguments
///
/// * `origin` - Start point in degrees
/// * `distance_m` - Great-circle distance in meters
/// * `bearing_deg` - Initial bearing in degrees
pub fn project(origin: &GeoPoint, distance_m: f64, bearing_deg: f64) -> GeoPoint {
    let lat1 = origin.lat.to_radians();
    let lng1 = origin.lng.to_radians();
    let theta = bearing_deg.to_radians();
    let delta = distance_m / EARTH_RADIUS_M;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
    let lng2 = lng1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    GeoPoint::new(lat2.to_degrees(), lng2.to_degrees())
}

/// Cubic ease-in-out curve over `t` in [0, 1]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Eased point between `start` and `end` at `progress` (clamped to [0, 1])
///
/// Interpolates linearly in degree-space after applying `ease_in_out_cubic`.
pub fn interpolate(start: &GeoPoint, end: &GeoPoint, progress: f64) -> GeoPoint {
    let t = ease_in_out_cubic(progress);
    GeoPoint::new(
        start.lat + (end.lat - start.lat) * t,
        start.lng + (end.lng - start.lng) * t,
    )
}
