//! Geographic value types shared by every engine component
//!
//! All coordinates are WGS84 degrees. Points have no identity: two points are
//! "the same" when they agree within a caller-chosen epsilon.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Meters spanned by one degree of latitude (and of longitude at the equator)
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Tolerance used when matching a point against the selection
pub const DEDUP_EPSILON: f64 = 1e-9;

/// Tolerance used to decide whether a re-snap actually moved anything
pub const CHANGE_EPSILON: f64 = 1e-12;

/// A latitude/longitude pair in degrees
///
/// Serializes as `{"lat": .., "lng": ..}`, the shape persisted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees, positive east
    pub lng: f64,
}

impl GeoPoint {
    /// Create a point from latitude and longitude in degrees
    #[inline]
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both axes differ by less than `epsilon`
    #[inline]
    #[must_use]
    pub fn approx_eq(&self, other: &GeoPoint, epsilon: f64) -> bool {
        (self.lat - other.lat).abs() < epsilon && (self.lng - other.lng).abs() < epsilon
    }

    /// Squared Euclidean distance in degree-space
    #[inline]
    #[must_use]
    pub fn distance_sq_deg(&self, other: &GeoPoint) -> f64 {
        let dlat = other.lat - self.lat;
        let dlng = other.lng - self.lng;
        dlat * dlat + dlng * dlng
    }
}

impl From<[f64; 2]> for GeoPoint {
    /// Static site data stores points as `[lat, lng]` pairs
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Rectangular viewport extent in degrees
///
/// `north >= south` always holds. `east >= west` is not enforced: a viewport
/// straddling the antimeridian is passed through as reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    /// Create a bounding box, ordering the latitude bounds if given reversed
    #[must_use]
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north: north.max(south),
            south: south.min(north),
            east,
            west,
        }
    }

    /// Build the box from the north-east and south-west corners, which is how
    /// map surfaces report their viewport
    #[must_use]
    pub fn from_corners(north_east: GeoPoint, south_west: GeoPoint) -> Self {
        Self::new(north_east.lat, south_west.lat, north_east.lng, south_west.lng)
    }

    /// Center of the box in degree-space
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.north + self.south) * 0.5,
            (self.east + self.west) * 0.5,
        )
    }

    /// Whether `point` lies inside the box (edges inclusive)
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_eq_uses_both_axes() {
        let a = GeoPoint::new(-15.0, -62.0);
        assert!(a.approx_eq(&GeoPoint::new(-15.0 + 1e-10, -62.0), DEDUP_EPSILON));
        assert!(!a.approx_eq(&GeoPoint::new(-15.0, -62.0 + 1e-8), DEDUP_EPSILON));
    }

    #[test]
    fn test_serde_shape_matches_persisted_layout() {
        let json = serde_json::to_string(&GeoPoint::new(1.5, -2.25)).unwrap();
        assert_eq!(json, r#"{"lat":1.5,"lng":-2.25}"#);
    }

    #[test]
    fn test_display_uses_six_decimals() {
        let p = GeoPoint::new(-15.000883, -62.000051);
        assert_eq!(p.to_string(), "-15.000883, -62.000051");
    }

    #[test]
    fn test_bounding_box_orders_latitudes() {
        let b = BoundingBox::new(0.0, 1.0, 1.0, 0.0);
        assert_eq!(b.north, 1.0);
        assert_eq!(b.south, 0.0);
        assert_eq!(b.center(), GeoPoint::new(0.5, 0.5));
        assert!(b.contains(&GeoPoint::new(1.0, 0.0)));
        assert!(!b.contains(&GeoPoint::new(1.1, 0.0)));
    }

    #[test]
    fn test_from_corners() {
        let b = BoundingBox::from_corners(GeoPoint::new(2.0, 3.0), GeoPoint::new(-1.0, -4.0));
        assert_eq!(b, BoundingBox::new(2.0, -1.0, 3.0, -4.0));
    }
}
