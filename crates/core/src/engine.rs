//! Map engine: the event-driven orchestrator
//!
//! Owns the camera, viewport tracker, grid, selection, weather, simulator and
//! store. The host feeds it input events (camera changes, pointer, clicks,
//! control changes) and advances time with `update(dt, map)`; the render
//! layer reads a [`FrameSnapshot`] each frame.

use crate::camera::CameraController;
use crate::config::{clamp_grid_size, EngineConfig};
use crate::core_types::{BoundingBox, GeoPoint, Meters};
use crate::grid::{Grid, GridSteps};
use crate::persistence::SimulationStore;
use crate::selection::{HoverPoint, SelectionSet};
use crate::site::SiteData;
use crate::spread::{
    ActionPlan, FireSpreadSimulator, FireVector, Radar, SimulationState, SpreadInput,
};
use crate::viewport::{MapSurface, ViewportBoundsTracker, ViewportObserver};
use crate::weather::{WeatherParams, WeatherSource};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Everything the render layer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub grid: Grid,
    pub selection: Vec<GeoPoint>,
    pub hover: Option<GeoPoint>,
    pub fire_vectors: Vec<FireVector>,
    pub action_plans: Vec<ActionPlan>,
    /// Perimeter of the selected day
    pub perimeter: Vec<GeoPoint>,
    pub radar: Option<Radar>,
    pub center: GeoPoint,
    pub zoom: f64,
    pub show_grid: bool,
    pub processing: bool,
    pub firewalls: Vec<GeoPoint>,
    pub day: Option<NaiveDate>,
    pub weather: WeatherParams,
}

/// Interactive wildfire map engine
pub struct MapEngine {
    config: EngineConfig,
    camera: CameraController,
    tracker: ViewportBoundsTracker,
    bounds: Option<BoundingBox>,
    grid_size: Meters,
    show_grid: bool,
    grid: Grid,
    selection: SelectionSet,
    hover: HoverPoint,
    weather: WeatherParams,
    weather_source: Option<Box<dyn WeatherSource>>,
    simulator: FireSpreadSimulator,
    results: SimulationState,
    store: Box<dyn SimulationStore>,
    site: SiteData,
    day: Option<NaiveDate>,
}

impl MapEngine {
    /// Create an engine and restore the last simulation results from `store`
    pub fn new(config: EngineConfig, store: Box<dyn SimulationStore>) -> Self {
        let config = config.normalized();
        let results = match store.load() {
            Some(state) => {
                info!(
                    "Restored {} fire vectors and {} action plans from store",
                    state.fire_vectors.len(),
                    state.action_plans.len()
                );
                state
            }
            None => SimulationState::default(),
        };

        info!(
            "Map engine created at {} (zoom {}), grid {}",
            config.center, config.zoom, config.grid_size
        );

        Self {
            camera: CameraController::new(config.center, config.zoom, config.min_zoom),
            tracker: ViewportBoundsTracker::new(config.resize_debounce_secs),
            bounds: None,
            grid_size: config.grid_size,
            show_grid: config.show_grid,
            grid: Grid::empty(),
            selection: SelectionSet::new(),
            hover: HoverPoint::default(),
            weather: config.weather,
            weather_source: None,
            simulator: FireSpreadSimulator::new(config.spread),
            results,
            store,
            site: SiteData::default(),
            day: None,
            config,
        }
    }

    /// Use a reproducible jitter sequence
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.simulator = FireSpreadSimulator::with_seed(self.config.spread, seed);
        self
    }

    /// Attach static site data and select its most recent day
    pub fn with_site(mut self, site: SiteData) -> Self {
        self.day = site.latest_day();
        self.site = site;
        self
    }

    /// Consult `source` for conditions while in auto weather mode
    pub fn with_weather_source(mut self, source: Box<dyn WeatherSource>) -> Self {
        self.weather_source = Some(source);
        self.refresh_weather();
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_size(&self) -> Meters {
        self.grid_size
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn hover(&self) -> Option<GeoPoint> {
        self.hover.get()
    }

    pub fn weather(&self) -> &WeatherParams {
        &self.weather
    }

    pub fn results(&self) -> &SimulationState {
        &self.results
    }

    pub fn is_processing(&self) -> bool {
        self.simulator.is_processing()
    }

    pub fn site(&self) -> &SiteData {
        &self.site
    }

    pub fn selected_day(&self) -> Option<NaiveDate> {
        self.day
    }

    /// Days with a detected perimeter, oldest first
    pub fn days(&self) -> Vec<NaiveDate> {
        self.site.days()
    }

    /// Grid spacing in degrees at the current camera latitude
    pub fn grid_steps(&self) -> GridSteps {
        GridSteps::from_meters(self.grid_size, self.camera.reference_lat())
    }

    // ------------------------------------------------------------------
    // Viewport and camera events
    // ------------------------------------------------------------------

    /// First contact with the map surface: arm idle and read bounds
    pub fn attach(&mut self, map: &dyn MapSurface) {
        self.rearm(map);
    }

    /// The surface reported a camera move
    pub fn on_camera_changed(&mut self, center: GeoPoint, zoom: f64, map: &dyn MapSurface) {
        let version = self.camera.on_camera_changed(center, zoom);
        debug!("Camera changed to {} zoom {} (version {})", center, zoom, version);
        self.rearm(map);
    }

    /// The surface finished moving
    pub fn on_idle(&mut self, map: &dyn MapSurface) {
        if let Some(bounds) = self.tracker.on_idle(map) {
            self.on_bounds_changed(bounds);
        }
    }

    /// The window was resized; bounds are re-read once resizing settles
    pub fn on_resize(&mut self) {
        self.tracker.on_resize();
    }

    /// Animate the camera to `target` over the configured duration
    pub fn fly_to(&mut self, target: GeoPoint) {
        self.camera.fly_to(target, self.config.fly_to_secs);
    }

    fn rearm(&mut self, map: &dyn MapSurface) {
        if let Some(bounds) = self.tracker.rearm(map) {
            self.on_bounds_changed(bounds);
        }
    }

    fn bump_camera(&mut self, map: &dyn MapSurface) {
        self.camera.bump_version();
        self.rearm(map);
    }

    /// Rebuild the grid for the current bounds and re-snap onto it
    fn regenerate(&mut self) {
        let steps = self.grid_steps();
        self.grid = Grid::generate(self.bounds.as_ref(), steps, self.config.grid_limits);
        debug!(
            "Grid regenerated: {} h-lines, {} v-lines, {} vertices",
            self.grid.h_lines.len(),
            self.grid.v_lines.len(),
            self.grid.vertices.len()
        );

        if self.bounds.is_none() {
            return;
        }
        self.hover.resnap(&self.grid.vertices);
        if self.selection.resnap(&self.grid.vertices) {
            debug!("Selection re-snapped to {} points", self.selection.len());
        }
    }

    // ------------------------------------------------------------------
    // Grid controls and pointer input
    // ------------------------------------------------------------------

    /// Change the grid spacing (clamped to 5-50 m)
    pub fn set_grid_size(&mut self, size: f64, map: &dyn MapSurface) {
        let size = clamp_grid_size(Meters::new(size));
        if size == self.grid_size {
            return;
        }
        self.grid_size = size;
        self.regenerate();
        self.bump_camera(map);
    }

    pub fn set_show_grid(&mut self, show: bool, map: &dyn MapSurface) {
        if show == self.show_grid {
            return;
        }
        self.show_grid = show;
        if show {
            self.bump_camera(map);
        }
    }

    /// Highlight the vertex nearest to the pointer while the grid is shown
    pub fn pointer_moved(&mut self, at: GeoPoint) {
        if !self.show_grid {
            return;
        }
        self.hover.track(&at, &self.grid.vertices);
    }

    /// Toggle the hovered vertex in the selection
    ///
    /// # Returns
    ///
    /// `None` when the click was ignored (grid hidden or nothing hovered),
    /// otherwise whether the vertex is now selected
    pub fn click(&mut self) -> Option<bool> {
        if !self.show_grid {
            return None;
        }
        let point = self.hover.get()?;
        Some(self.toggle_point(point))
    }

    /// Add `point` to the selection, or remove it if already selected
    pub fn toggle_point(&mut self, point: GeoPoint) -> bool {
        let selected = self.selection.toggle(point);
        debug!(
            "{} ignition point {}",
            if selected { "Selected" } else { "Deselected" },
            point
        );
        selected
    }

    /// Remove `point` from the selection if present
    pub fn remove_point(&mut self, point: GeoPoint) -> bool {
        if !self.selection.contains(&point) {
            return false;
        }
        self.selection.toggle(point);
        true
    }

    // ------------------------------------------------------------------
    // Weather
    // ------------------------------------------------------------------

    pub fn set_auto_weather(&mut self, auto: bool) {
        self.weather.auto = auto;
        if auto {
            self.refresh_weather();
        }
    }

    pub fn set_wind_speed(&mut self, speed: f64) {
        self.weather.set_wind_speed(speed);
    }

    pub fn set_wind_direction(&mut self, direction: f64) {
        self.weather.set_wind_direction(direction);
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.weather.set_temperature(temperature);
    }

    pub fn set_humidity(&mut self, humidity: f64) {
        self.weather.set_humidity(humidity);
    }

    /// Pull current conditions from the weather source in auto mode
    ///
    /// # Returns
    ///
    /// `true` if the parameters were updated
    pub fn refresh_weather(&mut self) -> bool {
        if !self.weather.auto {
            return false;
        }
        let Some(source) = self.weather_source.as_ref() else {
            return false;
        };
        let Some(reading) = source.current(self.camera.center()) else {
            return false;
        };
        self.weather.apply_reading(&reading);
        debug!(
            "Weather refreshed: wind {} at {}",
            self.weather.wind_speed.value(),
            self.weather.wind_direction
        );
        true
    }

    // ------------------------------------------------------------------
    // Perimeters
    // ------------------------------------------------------------------

    /// Select the perimeter day shown and used by `process_perimeter`
    pub fn select_day(&mut self, day: NaiveDate) -> bool {
        if self.site.perimeter(day).is_none() {
            debug!("No perimeter for {}", day);
            return false;
        }
        self.day = Some(day);
        true
    }

    /// Radar circle around the selected day's perimeter
    pub fn radar(&self) -> Option<Radar> {
        self.site.perimeter(self.day?)?.radar()
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    /// Start a spread run from the current selection
    ///
    /// # Returns
    ///
    /// `false` if a run is already in flight
    pub fn process(&mut self) -> bool {
        if self.simulator.is_processing() {
            debug!("Spread run already in flight, ignoring trigger");
            return false;
        }
        self.refresh_weather();
        let input = SpreadInput::Ignitions(self.selection.points().to_vec());
        self.simulator
            .begin(input, self.weather.wind(), self.config.processing_delay_secs)
    }

    /// Start a spread run from the selected day's perimeter
    ///
    /// # Returns
    ///
    /// `false` if no perimeter is selected or a run is already in flight
    pub fn process_perimeter(&mut self) -> bool {
        let Some(perimeter) = self.day.and_then(|day| self.site.perimeter(day)) else {
            debug!("No perimeter selected, ignoring perimeter run");
            return false;
        };
        let input = SpreadInput::Perimeter(perimeter.clone());
        self.simulator
            .begin(input, self.weather.wind(), self.config.processing_delay_secs)
    }

    /// Advance time by `dt` seconds
    ///
    /// Steps the camera animation, the resize debounce and the pending spread
    /// run. A finished run replaces the results and is written to the store;
    /// a failed write is logged and otherwise ignored.
    pub fn update(&mut self, dt: f64, map: &dyn MapSurface) {
        if self.camera.update(dt) {
            self.rearm(map);
        }

        if let Some(bounds) = self.tracker.update(dt, map) {
            self.on_bounds_changed(bounds);
        }

        if let Some(result) = self.simulator.update(dt) {
            if let Err(e) = self.store.save(&result) {
                warn!("Failed to persist simulation results: {}", e);
            }
            self.results = result;
        }
    }

    /// Snapshot of the current frame for the render layer
    pub fn snapshot(&self) -> FrameSnapshot {
        let perimeter = self
            .day
            .and_then(|day| self.site.perimeter(day))
            .map(|p| p.points().to_vec())
            .unwrap_or_default();

        FrameSnapshot {
            grid: self.grid.clone(),
            selection: self.selection.points().to_vec(),
            hover: self.hover.get(),
            fire_vectors: self.results.fire_vectors.clone(),
            action_plans: self.results.action_plans.clone(),
            perimeter,
            radar: self.radar(),
            center: self.camera.center(),
            zoom: self.camera.zoom(),
            show_grid: self.show_grid,
            processing: self.is_processing(),
            firewalls: self.site.firewalls().to_vec(),
            day: self.day,
            weather: self.weather,
        }
    }
}

impl ViewportObserver for MapEngine {
    fn on_bounds_changed(&mut self, bounds: BoundingBox) {
        self.bounds = Some(bounds);
        self.regenerate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, StoreError};
    use crate::spread::SpreadConfig;

    struct FailingStore;

    impl SimulationStore for FailingStore {
        fn load(&self) -> Option<SimulationState> {
            None
        }

        fn save(&mut self, _state: &SimulationState) -> Result<(), StoreError> {
            Err(StoreError::SaveFailed("disk full".to_string()))
        }
    }

    fn small_box() -> BoundingBox {
        // About 100 m square at the default center
        BoundingBox::new(-15.0, -15.0009, -62.0, -62.0009)
    }

    fn engine() -> MapEngine {
        let config = EngineConfig {
            spread: SpreadConfig::deterministic(),
            ..EngineConfig::default()
        };
        let mut engine = MapEngine::new(config, Box::new(MemoryStore::new())).with_seed(1);
        engine.attach(&small_box());
        engine
    }

    /// Weather source that counts how often it is consulted
    struct CountingWeather(std::rc::Rc<std::cell::Cell<usize>>);

    impl WeatherSource for CountingWeather {
        fn current(&self, _at: GeoPoint) -> Option<WeatherParams> {
            self.0.set(self.0.get() + 1);
            Some(WeatherParams::default())
        }
    }

    #[test]
    fn test_attach_generates_grid() {
        let engine = engine();
        assert_eq!(engine.bounds(), Some(small_box()));
        assert!(!engine.grid().vertices.is_empty());
    }

    #[test]
    fn test_grid_empty_before_bounds() {
        let mut engine = MapEngine::new(EngineConfig::default(), Box::new(MemoryStore::new()));
        let no_layout: Option<BoundingBox> = None;
        engine.attach(&no_layout);
        assert!(engine.grid().is_empty());
    }

    #[test]
    fn test_hover_and_click_toggle() {
        let mut engine = engine();
        let target = engine.grid().vertices[5];
        engine.pointer_moved(GeoPoint::new(target.lat + 1e-6, target.lng - 1e-6));
        assert_eq!(engine.hover(), Some(target));

        assert_eq!(engine.click(), Some(true));
        assert_eq!(engine.selection().points(), &[target]);
        assert_eq!(engine.click(), Some(false));
        assert!(engine.selection().is_empty());
    }

    #[test]
    fn test_hidden_grid_ignores_pointer_and_click() {
        let mut engine = engine();
        let map = small_box();
        engine.set_show_grid(false, &map);
        engine.pointer_moved(engine.grid().vertices[0]);
        assert_eq!(engine.hover(), None);
        assert_eq!(engine.click(), None);
    }

    #[test]
    fn test_show_grid_and_grid_size_bump_camera_version() {
        let mut engine = engine();
        let map = small_box();
        let v0 = engine.camera().version();

        engine.set_show_grid(false, &map);
        assert_eq!(engine.camera().version(), v0);
        engine.set_show_grid(true, &map);
        assert_eq!(engine.camera().version(), v0 + 1);

        engine.set_grid_size(20.0, &map);
        assert_eq!(engine.camera().version(), v0 + 2);
        assert_eq!(*engine.grid_size(), 20.0);

        // Clamped, and unchanged size is not a change
        engine.set_grid_size(500.0, &map);
        assert_eq!(*engine.grid_size(), 50.0);
        engine.set_grid_size(60.0, &map);
        assert_eq!(engine.camera().version(), v0 + 3);
    }

    #[test]
    fn test_grid_size_change_resnaps_selection() {
        let mut engine = engine();
        let map = small_box();
        for i in 0..4 {
            let v = engine.grid().vertices[i];
            engine.toggle_point(v);
        }
        engine.set_grid_size(50.0, &map);
        assert!(engine.selection().len() <= 4);
        for p in engine.selection().points() {
            assert!(engine.grid().vertices.contains(p));
        }
    }

    #[test]
    fn test_remove_point() {
        let mut engine = engine();
        let v = engine.grid().vertices[0];
        engine.toggle_point(v);
        assert!(engine.remove_point(v));
        assert!(!engine.remove_point(v));
    }

    #[test]
    fn test_process_runs_after_delay_and_persists() {
        let mut engine = engine();
        let map = small_box();
        let v = engine.grid().vertices[0];
        engine.toggle_point(v);

        assert!(engine.process());
        assert!(!engine.process());
        assert!(engine.snapshot().processing);

        engine.update(2.0, &map);
        assert!(engine.results().is_empty());
        engine.update(1.0, &map);

        let snap = engine.snapshot();
        assert!(!snap.processing);
        assert_eq!(snap.fire_vectors.len(), 1);
        assert_eq!(snap.action_plans.len(), 1);
        assert_eq!(snap.fire_vectors[0].start, v);
    }

    #[test]
    fn test_failing_store_still_updates_results() {
        let config = EngineConfig::default();
        let mut engine = MapEngine::new(config, Box::new(FailingStore)).with_seed(9);
        let map = small_box();
        engine.attach(&map);
        engine.toggle_point(engine.grid().vertices[0]);
        assert!(engine.process());
        engine.update(3.0, &map);
        assert_eq!(engine.results().fire_vectors.len(), 1);
    }

    #[test]
    fn test_process_with_empty_selection() {
        let mut engine = engine();
        assert!(engine.process());
        engine.update(3.0, &small_box());
        let snap = engine.snapshot();
        assert!(snap.fire_vectors.is_empty());
        assert!(snap.action_plans.is_empty());
    }

    #[test]
    fn test_perimeter_run_without_site_is_ignored() {
        let mut engine = engine();
        assert!(!engine.process_perimeter());
        assert!(!engine.is_processing());
    }

    #[test]
    fn test_snapshot_json_uses_render_field_names() {
        let engine = engine();
        let json = serde_json::to_value(engine.snapshot()).unwrap();
        assert!(json.get("fireVectors").is_some());
        assert!(json.get("actionPlans").is_some());
        assert!(json["grid"].get("hLines").is_some());
        assert!(json["radar"].is_null());
    }

    #[test]
    fn test_trigger_while_processing_leaves_weather_alone() {
        let reads = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut engine = engine().with_weather_source(Box::new(CountingWeather(reads.clone())));
        let target = engine.grid().vertices[0];
        engine.toggle_point(target);

        let before = reads.get();
        assert!(engine.process());
        assert_eq!(reads.get(), before + 1);

        assert!(!engine.process());
        assert_eq!(reads.get(), before + 1);
    }
}
