//! Wildfire Map Core Library
//!
//! Geospatial engine behind the interactive wildfire map: a metric grid laid
//! over a continuously changing viewport, snapping of user-marked ignition
//! points onto that grid, and wind-driven fire-spread projection with
//! stochastic jitter.
//!
//! ## Overview
//!
//! - [`grid`]: meters-to-degrees conversion, capped lattice generation and
//!   nearest-vertex lookup
//! - [`selection`]: ignition point set and hover point, re-snapped whenever the
//!   grid is regenerated
//! - [`geodesy`]: spherical forward projection and camera easing
//! - [`spread`]: the fire-spread simulator, perimeters and action plans
//! - [`viewport`]: idle/resize driven bounds tracking
//! - [`engine`]: the [`MapEngine`] orchestrator and per-frame [`FrameSnapshot`]
//!
//! Rendering is external: the engine consumes a [`MapSurface`] for viewport
//! reads and produces plain geometric data.
//!
//! ```
//! use wildfire_map_core::{BoundingBox, EngineConfig, MapEngine, MemoryStore};
//!
//! let viewport = BoundingBox::new(-15.0, -15.001, -62.0, -62.001);
//! let mut engine = MapEngine::new(EngineConfig::default(), Box::new(MemoryStore::new()));
//! engine.attach(&viewport);
//! assert!(!engine.grid().vertices.is_empty());
//! ```

// Core types and utilities
pub mod core_types;
pub mod geodesy;

// Grid and selection
pub mod grid;
pub mod selection;

// Simulation inputs and outputs
pub mod site;
pub mod spread;
pub mod weather;

// Host integration
pub mod camera;
pub mod config;
pub mod engine;
pub mod persistence;
pub mod viewport;

// Re-export core types
pub use core_types::{BoundingBox, GeoPoint, METERS_PER_DEGREE};
pub use core_types::{Celsius, Degrees, Meters, MetersPerSecond, Percent};

// Re-export grid and selection types
pub use grid::{nearest_vertex, Grid, GridLimits, GridSteps};
pub use selection::{HoverPoint, SelectionSet};

// Re-export simulation types
pub use spread::{
    ActionPlan, FireSpreadSimulator, FireVector, PerimeterSample, Radar, SimulationState,
    SpreadConfig,
};
pub use weather::{WeatherParams, WeatherSource, Wind};

// Re-export engine types
pub use config::{ConfigError, EngineConfig};
pub use engine::{FrameSnapshot, MapEngine};
pub use persistence::{FileStore, MemoryStore, SimulationStore, StoreError};
pub use site::SiteData;
pub use viewport::{MapSurface, ViewportBoundsTracker, ViewportObserver};
