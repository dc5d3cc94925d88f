//! Fire-spread simulator with a single in-flight run
//!
//! A run is triggered with [`FireSpreadSimulator::begin`], which captures its
//! inputs, and completes once `update` has accumulated the processing delay.
//! Triggers while a run is pending are ignored.

use super::perimeter::PerimeterSample;
use super::{FireVector, SimulationState};
use crate::core_types::{Degrees, GeoPoint, Meters, MetersPerSecond};
use crate::geodesy;
use crate::weather::Wind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, info};

/// Jitter ranges and distance constants for both spread modes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadConfig {
    /// Half-width of the uniform bearing jitter in point mode
    pub bearing_jitter: Degrees,
    /// Arrow length before wind is added
    pub base_distance: Meters,
    /// Wind speed is clamped to `[0, max_wind_speed]` before scaling
    pub max_wind_speed: MetersPerSecond,
    /// Extra meters of arrow per m/s of wind
    pub meters_per_wind: f64,
    /// Half-width of the outward angle jitter in perimeter mode (radians)
    pub outward_jitter_rad: f64,
    /// Outward offset range in perimeter mode (degrees)
    pub outward_distance_deg: (f64, f64),
    /// Approximate number of perimeter points to sample
    pub perimeter_samples: usize,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            bearing_jitter: Degrees::new(25.0),
            base_distance: Meters::new(80.0),
            max_wind_speed: MetersPerSecond::new(60.0),
            meters_per_wind: 2.0,
            outward_jitter_rad: PI / 4.5,
            outward_distance_deg: (0.007, 0.011),
            perimeter_samples: 25,
        }
    }
}

impl SpreadConfig {
    /// Config with all randomness removed
    ///
    /// Bearings follow the wind exactly and perimeter offsets use the lower
    /// end of the outward distance range.
    pub fn deterministic() -> Self {
        let defaults = Self::default();
        Self {
            bearing_jitter: Degrees::new(0.0),
            outward_jitter_rad: 0.0,
            outward_distance_deg: (defaults.outward_distance_deg.0, defaults.outward_distance_deg.0),
            ..defaults
        }
    }

    /// Point-mode arrow length for the given wind speed (meters)
    pub fn spread_distance(&self, wind_speed: MetersPerSecond) -> f64 {
        *self.base_distance
            + wind_speed.value().clamp(0.0, *self.max_wind_speed) * self.meters_per_wind
    }
}

/// What a run projects from
#[derive(Debug, Clone, PartialEq)]
pub enum SpreadInput {
    /// User-marked ignition points
    Ignitions(Vec<GeoPoint>),
    /// Detected fire boundary for one day
    Perimeter(PerimeterSample),
}

impl SpreadInput {
    pub fn len(&self) -> usize {
        match self {
            SpreadInput::Ignitions(points) => points.len(),
            SpreadInput::Perimeter(perimeter) => perimeter.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Inputs captured when a run was triggered, plus the remaining delay
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRun {
    pub input: SpreadInput,
    pub wind: Wind,
    remaining_secs: f64,
}

impl PendingRun {
    /// Seconds left before the run completes
    pub fn remaining_secs(&self) -> f64 {
        self.remaining_secs.max(0.0)
    }
}

/// Simulator lifecycle
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SimulatorState {
    #[default]
    Idle,
    Processing(PendingRun),
}

/// Projects fire vectors from ignition points or perimeters
#[derive(Debug, Clone)]
pub struct FireSpreadSimulator {
    config: SpreadConfig,
    rng: StdRng,
    state: SimulatorState,
}

impl FireSpreadSimulator {
    /// Create a simulator seeded from the operating system
    pub fn new(config: SpreadConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_os_rng(),
            state: SimulatorState::Idle,
        }
    }

    /// Create a simulator with a reproducible jitter sequence
    pub fn with_seed(config: SpreadConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            state: SimulatorState::Idle,
        }
    }

    pub fn config(&self) -> &SpreadConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulatorState {
        &self.state
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.state, SimulatorState::Processing(_))
    }

    /// Start a run that completes after `delay_secs` of `update` time
    ///
    /// # Returns
    ///
    /// `false` if a run is already in flight; the pending run is left as is
    pub fn begin(&mut self, input: SpreadInput, wind: Wind, delay_secs: f64) -> bool {
        if self.is_processing() {
            debug!("Spread run already in flight, ignoring trigger");
            return false;
        }
        info!(
            "Spread run started: {} input points, wind {} at {}",
            input.len(),
            wind.speed.value(),
            wind.direction
        );
        self.state = SimulatorState::Processing(PendingRun {
            input,
            wind,
            remaining_secs: delay_secs,
        });
        true
    }

    /// Advance the pending run by `dt` seconds
    ///
    /// # Returns
    ///
    /// The run's result on the step where its delay elapses, `None` otherwise
    pub fn update(&mut self, dt: f64) -> Option<SimulationState> {
        let SimulatorState::Processing(pending) = &mut self.state else {
            return None;
        };
        pending.remaining_secs -= dt;
        if pending.remaining_secs > 0.0 {
            return None;
        }

        let SimulatorState::Processing(pending) = std::mem::take(&mut self.state) else {
            return None;
        };
        let result = self.run(&pending.input, pending.wind);
        info!(
            "Spread run finished: {} fire vectors",
            result.fire_vectors.len()
        );
        Some(result)
    }

    /// Compute a run immediately, without the processing delay
    pub fn run(&mut self, input: &SpreadInput, wind: Wind) -> SimulationState {
        let vectors = match input {
            SpreadInput::Ignitions(points) => self.spread_points(points, wind),
            SpreadInput::Perimeter(perimeter) => self.spread_perimeter(perimeter),
        };
        SimulationState::from_vectors(vectors)
    }

    /// One wind-driven vector per ignition point
    pub fn spread_points(&mut self, points: &[GeoPoint], wind: Wind) -> Vec<FireVector> {
        let distance = self.config.spread_distance(wind.speed);
        let half_width = *self.config.bearing_jitter;
        points
            .iter()
            .map(|start| {
                let bearing = *wind.direction + symmetric_jitter(&mut self.rng, half_width);
                FireVector {
                    start: *start,
                    end: geodesy::project(start, distance, bearing),
                }
            })
            .collect()
    }

    /// Outward vectors from a thinned perimeter
    ///
    /// The offset is applied directly in degree-space along the jittered
    /// centroid-to-point direction.
    pub fn spread_perimeter(&mut self, perimeter: &PerimeterSample) -> Vec<FireVector> {
        let Some(center) = perimeter.centroid() else {
            return Vec::new();
        };
        let (min_deg, max_deg) = self.config.outward_distance_deg;
        let half_width = self.config.outward_jitter_rad;
        let mut vectors = Vec::new();
        for start in perimeter.sampled(self.config.perimeter_samples) {
            let angle = PerimeterSample::outward_angle(&center, start)
                + symmetric_jitter(&mut self.rng, half_width);
            let distance = uniform_or_min(&mut self.rng, min_deg, max_deg);
            vectors.push(FireVector {
                start: *start,
                end: GeoPoint::new(
                    start.lat + distance * angle.sin(),
                    start.lng + distance * angle.cos(),
                ),
            });
        }
        vectors
    }
}

/// Uniform sample in `[-half_width, half_width)`, zero when the range is empty
fn symmetric_jitter(rng: &mut StdRng, half_width: f64) -> f64 {
    if half_width.is_finite() && half_width > 0.0 {
        rng.random_range(-half_width..half_width)
    } else {
        0.0
    }
}

/// Uniform sample in `[min, max)`, or `min` when the range is empty
fn uniform_or_min(rng: &mut StdRng, min: f64, max: f64) -> f64 {
    if min.is_finite() && max.is_finite() && max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}
