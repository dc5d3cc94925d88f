//! Detected fire perimeters
//!
//! A perimeter is the ordered boundary of a detected fire for one day. Its
//! centroid and radar radius are computed in degree-space with nalgebra
//! vectors (x = longitude, y = latitude).

use crate::core_types::{GeoPoint, METERS_PER_DEGREE};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

#[inline]
fn to_vector(point: &GeoPoint) -> Vector2<f64> {
    Vector2::new(point.lng, point.lat)
}

#[inline]
fn to_point(v: &Vector2<f64>) -> GeoPoint {
    GeoPoint::new(v.y, v.x)
}

/// Circle enclosing a perimeter, centered on its centroid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Radar {
    pub center: GeoPoint,
    pub radius_meters: f64,
}

/// Ordered boundary points of a detected fire
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerimeterSample {
    points: Vec<GeoPoint>,
}

impl PerimeterSample {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Arithmetic mean of the boundary points, `None` for an empty perimeter
    pub fn centroid(&self) -> Option<GeoPoint> {
        if self.points.is_empty() {
            return None;
        }
        let sum = self
            .points
            .iter()
            .map(to_vector)
            .fold(Vector2::zeros(), |acc, v| acc + v);
        Some(to_point(&(sum / self.points.len() as f64)))
    }

    /// Radar circle: centroid plus the largest centroid-to-point distance
    ///
    /// The radius is measured in degree-space and converted with the flat
    /// `METERS_PER_DEGREE` factor, so it is only indicative away from the equator.
    pub fn radar(&self) -> Option<Radar> {
        let center = self.centroid()?;
        let c = to_vector(&center);
        let max_deg = self
            .points
            .iter()
            .map(|p| (to_vector(p) - c).norm())
            .fold(0.0_f64, f64::max);
        Some(Radar {
            center,
            radius_meters: max_deg * METERS_PER_DEGREE,
        })
    }

    /// Stride used to thin the perimeter down to about `target_samples` points
    pub fn sample_interval(&self, target_samples: usize) -> usize {
        (self.points.len() / target_samples.max(1)).max(1)
    }

    /// Every `sample_interval`-th boundary point, starting with the first
    pub fn sampled(&self, target_samples: usize) -> impl Iterator<Item = &GeoPoint> + '_ {
        self.points.iter().step_by(self.sample_interval(target_samples))
    }

    /// Unit-length outward direction angle (radians, counter-clockwise from
    /// east in degree-space) of `point` as seen from `center`
    pub(crate) fn outward_angle(center: &GeoPoint, point: &GeoPoint) -> f64 {
        let d = to_vector(point) - to_vector(center);
        d.y.atan2(d.x)
    }
}

impl From<Vec<[f64; 2]>> for PerimeterSample {
    fn from(pairs: Vec<[f64; 2]>) -> Self {
        Self::new(pairs.into_iter().map(GeoPoint::from).collect())
    }
}
