//! Weather inputs for the fire-spread simulator
//!
//! Wind drives the point-mode spread bearing and arrow length. Temperature and
//! humidity are carried for display only. In auto mode the engine asks an
//! external [`WeatherSource`] for current conditions at the camera center.

use crate::core_types::{Celsius, Degrees, GeoPoint, MetersPerSecond, Percent};
use serde::{Deserialize, Serialize};

/// Accepted wind speed range (m/s)
pub const WIND_SPEED_RANGE: (f64, f64) = (0.0, 60.0);
/// Accepted wind direction range (degrees, direction of travel)
pub const WIND_DIRECTION_RANGE: (f64, f64) = (0.0, 360.0);
/// Accepted temperature range (°C)
pub const TEMPERATURE_RANGE: (f64, f64) = (-50.0, 50.0);
/// Accepted relative humidity range (%)
pub const HUMIDITY_RANGE: (f64, f64) = (0.0, 100.0);

/// Wind speed and direction handed to the simulator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub direction: Degrees,
    pub speed: MetersPerSecond,
}

/// Current weather parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherParams {
    /// Follow the external weather source instead of manual values
    pub auto: bool,
    pub wind_speed: MetersPerSecond,
    pub wind_direction: Degrees,
    pub temperature: Celsius,
    pub humidity: Percent,
}

impl Default for WeatherParams {
    fn default() -> Self {
        Self {
            auto: true,
            wind_speed: MetersPerSecond::new(10.0),
            wind_direction: Degrees::new(90.0),
            temperature: Celsius::new(20.0),
            humidity: Percent::new(50.0),
        }
    }
}

impl WeatherParams {
    pub fn wind(&self) -> Wind {
        Wind {
            direction: self.wind_direction,
            speed: self.wind_speed,
        }
    }

    pub fn set_wind_speed(&mut self, speed: f64) {
        self.wind_speed = MetersPerSecond::new(clamp_to(speed, WIND_SPEED_RANGE));
    }

    pub fn set_wind_direction(&mut self, direction: f64) {
        self.wind_direction = Degrees::new(clamp_to(direction, WIND_DIRECTION_RANGE));
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = Celsius::new(clamp_to(temperature, TEMPERATURE_RANGE));
    }

    pub fn set_humidity(&mut self, humidity: f64) {
        self.humidity = Percent::new(clamp_to(humidity, HUMIDITY_RANGE));
    }

    /// Copy of these parameters with every value pulled into its range
    ///
    /// Applied to values arriving from config files and weather sources.
    #[must_use]
    pub fn clamped(self) -> Self {
        let mut out = self;
        out.set_wind_speed(*self.wind_speed);
        out.set_wind_direction(*self.wind_direction);
        out.set_temperature(*self.temperature);
        out.set_humidity(*self.humidity);
        out
    }

    /// Take the measured values from `reading`, keeping the current mode
    pub fn apply_reading(&mut self, reading: &WeatherParams) {
        let auto = self.auto;
        *self = reading.clamped();
        self.auto = auto;
    }
}

fn clamp_to(value: f64, (min, max): (f64, f64)) -> f64 {
    value.clamp(min, max)
}

/// External provider of current weather conditions
///
/// Returning `None` leaves the engine's parameters untouched.
pub trait WeatherSource {
    fn current(&self, at: GeoPoint) -> Option<WeatherParams>;
}

/// Source that always reports the same conditions
#[derive(Debug, Clone, Copy)]
pub struct FixedWeather(pub WeatherParams);

impl WeatherSource for FixedWeather {
    fn current(&self, _at: GeoPoint) -> Option<WeatherParams> {
        Some(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_sidebar() {
        let w = WeatherParams::default();
        assert!(w.auto);
        assert_eq!(*w.wind_speed, 10.0);
        assert_eq!(*w.wind_direction, 90.0);
        assert_eq!(*w.temperature, 20.0);
        assert_eq!(*w.humidity, 50.0);
    }

    #[test]
    fn test_setters_clamp() {
        let mut w = WeatherParams::default();
        w.set_wind_speed(75.0);
        w.set_wind_direction(-10.0);
        w.set_temperature(-80.0);
        w.set_humidity(140.0);
        assert_eq!(*w.wind_speed, 60.0);
        assert_eq!(*w.wind_direction, 0.0);
        assert_eq!(*w.temperature, -50.0);
        assert_eq!(*w.humidity, 100.0);

        w.set_wind_direction(400.0);
        assert_eq!(*w.wind_direction, 360.0);
    }

    #[test]
    fn test_apply_reading_keeps_mode() {
        let mut w = WeatherParams {
            auto: true,
            ..WeatherParams::default()
        };
        let reading = WeatherParams {
            auto: false,
            wind_speed: MetersPerSecond::new(90.0),
            wind_direction: Degrees::new(180.0),
            temperature: Celsius::new(31.0),
            humidity: Percent::new(12.0),
        };
        w.apply_reading(&reading);
        assert!(w.auto);
        assert_eq!(*w.wind_speed, 60.0);
        assert_eq!(*w.wind_direction, 180.0);
        assert_eq!(*w.temperature, 31.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let w: WeatherParams = serde_json::from_str(r#"{"auto": false, "wind_speed": 4.5}"#).unwrap();
        assert!(!w.auto);
        assert_eq!(*w.wind_speed, 4.5);
        assert_eq!(*w.wind_direction, 90.0);
    }
}
