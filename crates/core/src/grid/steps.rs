//! Metric grid spacing expressed as degree steps

use crate::core_types::{Meters, METERS_PER_DEGREE};
use serde::{Deserialize, Serialize};

/// Latitude/longitude increments between neighbouring grid lines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSteps {
    /// Degrees of latitude between horizontal lines
    pub lat_step_deg: f64,
    /// Degrees of longitude between vertical lines
    pub lng_step_deg: f64,
}

impl GridSteps {
    /// Convert a metric spacing into degree steps at `reference_lat`
    ///
    /// Longitude degrees shrink by `cos(lat)` away from the equator. The
    /// meters-per-degree divisor is floored at 1 so the result stays finite
    /// near the poles; it is not meaningful there. Non-finite inputs
    /// propagate into the result.
    ///
    /// # Arguments
    ///
    /// * `meters` - Target spacing between grid lines
    /// * `reference_lat` - Latitude (degrees) at which the spacing holds
    #[must_use]
    pub fn from_meters(meters: Meters, reference_lat: f64) -> Self {
        let mut meters_per_deg_lng = METERS_PER_DEGREE * reference_lat.to_radians().cos();
        // `f64::max` would swallow NaN here
        if meters_per_deg_lng < 1.0 {
            meters_per_deg_lng = 1.0;
        }
        Self {
            lat_step_deg: *meters / METERS_PER_DEGREE,
            lng_step_deg: *meters / meters_per_deg_lng,
        }
    }
}
