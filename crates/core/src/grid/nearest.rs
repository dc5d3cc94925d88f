//! Nearest-vertex lookup
//!
//! Linear scan in degree-space. Vertex counts are capped by `GridLimits`, so a
//! spatial index would cost more to rebuild on every regeneration than it saves.

use crate::core_types::GeoPoint;

/// Return the candidate closest to `point` by squared degree distance
///
/// Only a strictly smaller distance replaces the current best, so ties and
/// unordered (NaN) distances keep the first candidate encountered. Returns `None` when
/// `candidates` is empty.
pub fn nearest_vertex(point: &GeoPoint, candidates: &[GeoPoint]) -> Option<GeoPoint> {
    let mut best: Option<(GeoPoint, f64)> = None;
    for candidate in candidates {
        let d = point.distance_sq_deg(candidate);
        let closer = match best {
            Some((_, best_d)) => d < best_d,
            None => true,
        };
        if closer {
            best = Some((*candidate, d));
        }
    }
    best.map(|(vertex, _)| vertex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_candidates() {
        assert_eq!(nearest_vertex(&GeoPoint::new(0.0, 0.0), &[]), None);
    }

    #[test]
    fn test_picks_closest() {
        let candidates = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(0.0, 1.0),
        ];
        let nearest = nearest_vertex(&GeoPoint::new(0.1, 0.9), &candidates);
        assert_eq!(nearest, Some(GeoPoint::new(0.0, 1.0)));
    }

    #[test]
    fn test_first_minimum_wins_ties() {
        let candidates = [
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(-1.0, 0.0),
            GeoPoint::new(0.0, 1.0),
        ];
        let nearest = nearest_vertex(&GeoPoint::new(0.0, 0.0), &candidates);
        assert_eq!(nearest, Some(GeoPoint::new(1.0, 0.0)));
    }

    #[test]
    fn test_exact_hit() {
        let candidates = [GeoPoint::new(3.0, 4.0), GeoPoint::new(5.0, 6.0)];
        let nearest = nearest_vertex(&GeoPoint::new(5.0, 6.0), &candidates);
        assert_eq!(nearest, Some(GeoPoint::new(5.0, 6.0)));
    }

    #[test]
    fn test_nan_first_candidate_is_kept() {
        let candidates = [GeoPoint::new(f64::NAN, 0.0), GeoPoint::new(0.0, 0.0)];
        let nearest = nearest_vertex(&GeoPoint::new(0.0, 0.0), &candidates).unwrap();
        assert!(nearest.lat.is_nan());
    }
}
