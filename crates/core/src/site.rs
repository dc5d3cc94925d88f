//! Static site data: detected perimeters by day and firewall placements
//!
//! File layout:
//! ```json
//! {
//!   "perimeters": { "2021-09-04": [[-15.0, -62.0], [-15.0, -61.99]] },
//!   "firewalls": [[-15.001, -62.0005]]
//! }
//! ```
//! Points are `[lat, lng]` pairs. Day keys are ISO dates; keys that do not
//! parse are skipped.

use crate::config::ConfigError;
use crate::core_types::GeoPoint;
use crate::spread::PerimeterSample;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Format of perimeter day keys
pub const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Deserialize)]
struct RawSiteData {
    #[serde(default)]
    perimeters: BTreeMap<String, Vec<[f64; 2]>>,
    #[serde(default)]
    firewalls: Vec<[f64; 2]>,
}

/// Perimeters keyed by day plus fixed firewall placements
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SiteData {
    perimeters: BTreeMap<NaiveDate, PerimeterSample>,
    firewalls: Vec<GeoPoint>,
}

impl SiteData {
    pub fn new(perimeters: BTreeMap<NaiveDate, PerimeterSample>, firewalls: Vec<GeoPoint>) -> Self {
        Self {
            perimeters,
            firewalls,
        }
    }

    /// Load site data from a JSON file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        Self::from_json(&contents)
    }

    /// Parse site data from JSON text
    ///
    /// # Errors
    /// Returns error if the document structure is invalid. Individual day keys
    /// that are not dates are skipped with a warning.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawSiteData =
            serde_json::from_str(contents).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;

        let mut perimeters = BTreeMap::new();
        for (key, points) in raw.perimeters {
            if let Some(day) = parse_day(&key) {
                perimeters.insert(day, PerimeterSample::from(points));
            } else {
                warn!("Skipping perimeter with unparsable day key '{}'", key);
            }
        }
        let firewalls: Vec<GeoPoint> = raw.firewalls.into_iter().map(GeoPoint::from).collect();

        info!(
            "Site data loaded: {} perimeter days, {} firewalls",
            perimeters.len(),
            firewalls.len()
        );
        Ok(Self::new(perimeters, firewalls))
    }

    /// Days with a perimeter, oldest first
    pub fn days(&self) -> Vec<NaiveDate> {
        self.perimeters.keys().copied().collect()
    }

    pub fn latest_day(&self) -> Option<NaiveDate> {
        self.perimeters.keys().next_back().copied()
    }

    pub fn perimeter(&self, day: NaiveDate) -> Option<&PerimeterSample> {
        self.perimeters.get(&day)
    }

    pub fn firewalls(&self) -> &[GeoPoint] {
        &self.firewalls
    }
}

/// Parse a `YYYY-MM-DD` day key
pub fn parse_day(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DAY_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = r#"{
        "perimeters": {
            "2021-09-05": [[0.0, 0.0], [0.0, 2.0], [2.0, 2.0], [2.0, 0.0]],
            "2021-09-04": [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
            "yesterday": [[5.0, 5.0]]
        },
        "firewalls": [[-15.001, -62.0005], [-15.0012, -62.0001]]
    }"#;

    fn day(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    #[test]
    fn test_days_sorted_and_bad_keys_skipped() {
        let site = SiteData::from_json(SITE).unwrap();
        assert_eq!(site.days(), vec![day("2021-09-04"), day("2021-09-05")]);
        assert_eq!(site.latest_day(), Some(day("2021-09-05")));
    }

    #[test]
    fn test_points_are_lat_lng_pairs() {
        let site = SiteData::from_json(SITE).unwrap();
        let perimeter = site.perimeter(day("2021-09-04")).unwrap();
        assert_eq!(perimeter.points()[1], GeoPoint::new(0.0, 1.0));
        assert_eq!(site.firewalls()[0], GeoPoint::new(-15.001, -62.0005));
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let site = SiteData::from_json("{}").unwrap();
        assert!(site.days().is_empty());
        assert!(site.firewalls().is_empty());
        assert_eq!(site.latest_day(), None);
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(
            SiteData::from_json(r#"{"firewalls": "north"}"#),
            Err(ConfigError::ParseFailed(_))
        ));
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("2021-09-04"), NaiveDate::from_ymd_opt(2021, 9, 4));
        assert_eq!(parse_day("04/09/2021"), None);
    }
}
