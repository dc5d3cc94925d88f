//! Viewport bounds tracking
//!
//! The rendering adapter reports camera settle ("idle") and window resize
//! events. The tracker decides when the current bounds should be re-read and
//! published to a [`ViewportObserver`]:
//! - an idle signal publishes once per arming, and every camera change re-arms
//!   it with an immediate read in case idle already fired
//! - resize events are debounced; bounds are read once the window has been
//!   quiet for the debounce interval

use crate::core_types::BoundingBox;
use tracing::debug;

/// Default resize debounce interval (seconds)
pub const DEFAULT_RESIZE_DEBOUNCE_SECS: f64 = 0.15;

/// Read access to the rendering surface's current viewport
pub trait MapSurface {
    /// Current visible extent, `None` until the surface has laid out
    fn bounds(&self) -> Option<BoundingBox>;
}

/// Receiver of republished viewport bounds
pub trait ViewportObserver {
    fn on_bounds_changed(&mut self, bounds: BoundingBox);
}

impl MapSurface for BoundingBox {
    fn bounds(&self) -> Option<BoundingBox> {
        Some(*self)
    }
}

impl MapSurface for Option<BoundingBox> {
    fn bounds(&self) -> Option<BoundingBox> {
        *self
    }
}

/// Decides when viewport bounds are re-read from the map surface
#[derive(Debug, Clone)]
pub struct ViewportBoundsTracker {
    debounce_secs: f64,
    idle_armed: bool,
    resize_remaining: Option<f64>,
}

impl Default for ViewportBoundsTracker {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_DEBOUNCE_SECS)
    }
}

impl ViewportBoundsTracker {
    pub fn new(debounce_secs: f64) -> Self {
        Self {
            debounce_secs,
            idle_armed: false,
            resize_remaining: None,
        }
    }

    pub fn is_idle_armed(&self) -> bool {
        self.idle_armed
    }

    pub fn resize_pending(&self) -> bool {
        self.resize_remaining.is_some()
    }

    /// Arm the one-shot idle listener and read the bounds immediately
    pub fn rearm(&mut self, map: &dyn MapSurface) -> Option<BoundingBox> {
        self.idle_armed = true;
        map.bounds()
    }

    /// Camera settled; publishes only if the listener is armed
    pub fn on_idle(&mut self, map: &dyn MapSurface) -> Option<BoundingBox> {
        if !self.idle_armed {
            return None;
        }
        self.idle_armed = false;
        map.bounds()
    }

    /// Window resized; restarts the debounce timer
    pub fn on_resize(&mut self) {
        self.resize_remaining = Some(self.debounce_secs);
    }

    /// Advance the debounce timer by `dt` seconds
    ///
    /// # Returns
    ///
    /// The surface bounds on the step where the debounce interval elapses
    pub fn update(&mut self, dt: f64, map: &dyn MapSurface) -> Option<BoundingBox> {
        let remaining = self.resize_remaining.as_mut()?;
        *remaining -= dt;
        if *remaining > 0.0 {
            return None;
        }
        self.resize_remaining = None;
        debug!("Resize settled, re-reading viewport bounds");
        map.bounds()
    }
}
