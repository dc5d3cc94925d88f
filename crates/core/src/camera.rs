//! Camera center/zoom and eased fly-to animation
//!
//! The camera version is bumped on every camera change. Consumers compare
//! versions to know when viewport-derived state has to be refreshed.

use crate::core_types::GeoPoint;
use crate::geodesy;
use serde::{Deserialize, Serialize};

/// An in-progress eased move between two centers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraAnimation {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub duration_secs: f64,
    elapsed_secs: f64,
}

impl CameraAnimation {
    pub fn new(start: GeoPoint, end: GeoPoint, duration_secs: f64) -> Self {
        Self {
            start,
            end,
            duration_secs,
            elapsed_secs: 0.0,
        }
    }

    /// Fraction of the animation completed, in [0, 1]
    pub fn progress(&self) -> f64 {
        if self.duration_secs <= 0.0 {
            1.0
        } else {
            (self.elapsed_secs / self.duration_secs).clamp(0.0, 1.0)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Advance by `dt` seconds and return the eased position
    pub fn step(&mut self, dt: f64) -> GeoPoint {
        self.elapsed_secs += dt.max(0.0);
        self.current()
    }

    pub fn current(&self) -> GeoPoint {
        geodesy::interpolate(&self.start, &self.end, self.progress())
    }
}

/// Camera center and zoom as last reported by the map surface
#[derive(Debug, Clone)]
pub struct CameraController {
    center: GeoPoint,
    zoom: f64,
    min_zoom: f64,
    version: u64,
    animation: Option<CameraAnimation>,
}

impl CameraController {
    pub fn new(center: GeoPoint, zoom: f64, min_zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.max(min_zoom),
            min_zoom,
            version: 0,
            animation: None,
        }
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Latitude used to size longitude grid steps
    pub fn reference_lat(&self) -> f64 {
        self.center.lat
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Increment the camera version
    pub fn bump_version(&mut self) -> u64 {
        self.version = self.version.wrapping_add(1);
        self.version
    }

    /// Record a camera move reported by the surface and bump the version
    ///
    /// Zoom below `min_zoom` is raised to it.
    pub fn on_camera_changed(&mut self, center: GeoPoint, zoom: f64) -> u64 {
        self.center = center;
        self.zoom = zoom.max(self.min_zoom);
        self.bump_version()
    }

    /// Start an eased move of the center to `target`
    ///
    /// A non-positive duration jumps straight to the target on the next `update`.
    pub fn fly_to(&mut self, target: GeoPoint, duration_secs: f64) {
        self.animation = Some(CameraAnimation::new(self.center, target, duration_secs));
    }

    /// Advance the running animation
    ///
    /// # Returns
    ///
    /// `true` if the center moved (the version has been bumped)
    pub fn update(&mut self, dt: f64) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        let next = animation.step(dt);
        if animation.is_finished() {
            self.animation = None;
        }
        self.center = next;
        self.bump_version();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_camera_change_bumps_version_and_clamps_zoom() {
        let mut camera = CameraController::new(GeoPoint::new(0.0, 0.0), 20.0, 13.0);
        assert_eq!(camera.version(), 0);
        assert_eq!(camera.on_camera_changed(GeoPoint::new(1.0, 2.0), 10.0), 1);
        assert_eq!(camera.zoom(), 13.0);
        assert_eq!(camera.reference_lat(), 1.0);
    }

    #[test]
    fn test_fly_to_reaches_target_after_duration() {
        let start = GeoPoint::new(-15.0, -62.0);
        let target = GeoPoint::new(-14.0, -61.0);
        let mut camera = CameraController::new(start, 20.0, 13.0);
        camera.fly_to(target, 1.0);

        assert!(camera.update(0.5));
        let mid = camera.center();
        assert_abs_diff_eq!(mid.lat, -14.5, epsilon = 1e-12);
        assert!(camera.is_animating());

        assert!(camera.update(0.5));
        assert_eq!(camera.center(), target);
        assert!(!camera.is_animating());
        assert!(!camera.update(0.5));
        assert_eq!(camera.version(), 2);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let mut camera = CameraController::new(GeoPoint::new(0.0, 0.0), 20.0, 13.0);
        camera.fly_to(GeoPoint::new(5.0, 5.0), 0.0);
        assert!(camera.update(0.0));
        assert_eq!(camera.center(), GeoPoint::new(5.0, 5.0));
        assert!(!camera.is_animating());
    }

    #[test]
    fn test_animation_progress_clamped() {
        let mut anim = CameraAnimation::new(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0), 2.0);
        anim.step(-1.0);
        assert_eq!(anim.progress(), 0.0);
        anim.step(10.0);
        assert_eq!(anim.progress(), 1.0);
        assert_eq!(anim.current(), GeoPoint::new(1.0, 1.0));
    }
}
