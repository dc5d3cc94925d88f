//! Engine configuration
//!
//! Every field has a default matching the map page's initial state, so a
//! config file only needs the values it overrides.

use crate::core_types::{GeoPoint, Meters};
use crate::grid::GridLimits;
use crate::spread::SpreadConfig;
use crate::viewport::DEFAULT_RESIZE_DEBOUNCE_SECS;
use crate::weather::WeatherParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Smallest grid spacing the size control accepts
pub const MIN_GRID_SIZE: Meters = Meters::new(5.0);
/// Largest grid spacing the size control accepts
pub const MAX_GRID_SIZE: Meters = Meters::new(50.0);

/// Startup configuration for [`crate::MapEngine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial camera center
    pub center: GeoPoint,
    pub zoom: f64,
    /// The camera never zooms out past this level
    pub min_zoom: f64,
    /// Grid spacing
    pub grid_size: Meters,
    pub show_grid: bool,
    pub grid_limits: GridLimits,
    pub weather: WeatherParams,
    pub spread: SpreadConfig,
    /// Artificial delay before a spread run completes
    pub processing_delay_secs: f64,
    pub resize_debounce_secs: f64,
    /// Default fly-to animation length
    pub fly_to_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(-15.000_883, -62.000_051),
            zoom: 20.0,
            min_zoom: 13.0,
            grid_size: Meters::new(10.0),
            show_grid: true,
            grid_limits: GridLimits::default(),
            weather: WeatherParams::default(),
            spread: SpreadConfig::default(),
            processing_delay_secs: 3.0,
            resize_debounce_secs: DEFAULT_RESIZE_DEBOUNCE_SECS,
            fly_to_secs: 1.0,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file
    ///
    /// Grid size and weather values are pulled into their accepted ranges.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        Self::from_json(&contents)
    }

    /// Parse a configuration from JSON text
    ///
    /// # Errors
    /// Returns error if the text is not a valid configuration
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(contents).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Ok(config.normalized())
    }

    /// Copy with out-of-range values clamped
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            grid_size: clamp_grid_size(self.grid_size),
            weather: self.weather.clamped(),
            zoom: self.zoom.max(self.min_zoom),
            ..self
        }
    }
}

/// Clamp a grid spacing to the accepted range
pub fn clamp_grid_size(size: Meters) -> Meters {
    size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE)
}

/// Errors that can occur when reading configuration or site data
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read file
    LoadFailed(String),
    /// Failed to parse file contents
    ParseFailed(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadFailed(msg) => write!(f, "Failed to load: {msg}"),
            ConfigError::ParseFailed(msg) => write!(f, "Failed to parse: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
