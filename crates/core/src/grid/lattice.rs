//! Viewport grid generation
//!
//! Produces the horizontal/vertical grid lines and the vertex lattice covering
//! a viewport. The first line is floor-snapped to a multiple of the step so the
//! lattice is anchored to absolute coordinates and does not drift while the
//! viewport pans.

use super::steps::GridSteps;
use crate::core_types::{BoundingBox, GeoPoint};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bounds on generated geometry
///
/// A tiny step over a wide viewport would otherwise produce unbounded work;
/// hitting a cap truncates the grid silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLimits {
    /// Cap on horizontal lines, on vertical lines, and on vertices per row sweep
    pub max_lines: usize,
    /// Cap on total vertices
    pub max_vertices: usize,
}

impl GridLimits {
    pub const DEFAULT_MAX_LINES: usize = 2_000;
    pub const DEFAULT_MAX_VERTICES: usize = 12_000;
}

impl Default for GridLimits {
    fn default() -> Self {
        Self {
            max_lines: Self::DEFAULT_MAX_LINES,
            max_vertices: Self::DEFAULT_MAX_VERTICES,
        }
    }
}

/// Grid line segment: exactly two endpoints
pub type GridLine = [GeoPoint; 2];

/// Generated grid geometry for one viewport
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    /// Lines of constant latitude, west to east
    pub h_lines: Vec<GridLine>,
    /// Lines of constant longitude, south to north
    pub v_lines: Vec<GridLine>,
    /// Lattice intersection points inside the viewport, row-major from the south-west
    pub vertices: Vec<GeoPoint>,
}

impl Grid {
    /// Grid with no lines and no vertices
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no geometry was generated
    pub fn is_empty(&self) -> bool {
        self.h_lines.is_empty() && self.v_lines.is_empty() && self.vertices.is_empty()
    }

    /// Generate the grid covering `bounds`
    ///
    /// Returns an empty grid when `bounds` is `None` (the viewport has not
    /// reported yet). Pure: identical inputs give bit-identical output.
    ///
    /// # Arguments
    ///
    /// * `bounds` - Current viewport, if known
    /// * `steps` - Degree spacing between lines
    /// * `limits` - Safety caps on generated geometry
    pub fn generate(bounds: Option<&BoundingBox>, steps: GridSteps, limits: GridLimits) -> Self {
        let Some(bounds) = bounds else {
            return Self::empty();
        };
        let BoundingBox {
            north,
            south,
            east,
            west,
        } = *bounds;
        let GridSteps {
            lat_step_deg,
            lng_step_deg,
        } = steps;

        let start_lat = (south / lat_step_deg).floor() * lat_step_deg;
        let start_lng = (west / lng_step_deg).floor() * lng_step_deg;

        let mut grid = Self::empty();

        // Horizontal lines, with the vertex row along each
        let mut lat = start_lat;
        while lat <= north && grid.h_lines.len() < limits.max_lines {
            grid.h_lines
                .push([GeoPoint::new(lat, west), GeoPoint::new(lat, east)]);

            let mut lng = start_lng;
            let mut row_count = 0;
            while lng <= east
                && grid.vertices.len() < limits.max_vertices
                && row_count < limits.max_lines
            {
                if lng >= west && lat >= south {
                    grid.vertices.push(GeoPoint::new(lat, lng));
                }
                lng += lng_step_deg;
                row_count += 1;
            }
            lat += lat_step_deg;
        }

        // Vertical lines
        let mut lng = start_lng;
        while lng <= east && grid.v_lines.len() < limits.max_lines {
            grid.v_lines
                .push([GeoPoint::new(south, lng), GeoPoint::new(north, lng)]);
            lng += lng_step_deg;
        }

        if grid.vertices.len() >= limits.max_vertices
            || grid.h_lines.len() >= limits.max_lines
            || grid.v_lines.len() >= limits.max_lines
        {
            debug!(
                "Grid truncated at caps: {} h-lines, {} v-lines, {} vertices",
                grid.h_lines.len(),
                grid.v_lines.len(),
                grid.vertices.len()
            );
        }

        grid
    }
}
