//! Ignition point selection and hover tracking
//!
//! The selection persists across grid regeneration: whenever the vertex set
//! changes, every selected point and the hover point are snapped onto the new
//! lattice (`resnap`).

use crate::core_types::{GeoPoint, CHANGE_EPSILON, DEDUP_EPSILON};
use crate::grid::nearest_vertex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Ordered set of user-marked ignition points
///
/// Membership is epsilon-based (`DEDUP_EPSILON`), never exact float equality.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionSet {
    points: Vec<GeoPoint>,
}

impl SelectionSet {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected points in insertion order
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the member matching `point` within `DEDUP_EPSILON`
    pub fn position(&self, point: &GeoPoint) -> Option<usize> {
        self.points
            .iter()
            .position(|p| p.approx_eq(point, DEDUP_EPSILON))
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.position(point).is_some()
    }

    /// Add `point` if absent, remove the matching member if present
    ///
    /// # Returns
    ///
    /// `true` if the point is selected after the call
    pub fn toggle(&mut self, point: GeoPoint) -> bool {
        if let Some(idx) = self.position(&point) {
            self.points.remove(idx);
            false
        } else {
            self.points.push(point);
            true
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Snap every member onto `vertices`, dedup, and replace if anything moved
    ///
    /// Members that cannot be resolved (empty vertex set) are dropped. Two
    /// members landing on the same vertex collapse into one, keyed on the
    /// coordinates rounded to 9 decimals. The selection is only replaced when
    /// the length changed or some member moved by more than `CHANGE_EPSILON`,
    /// so a no-op pass leaves it untouched.
    ///
    /// # Returns
    ///
    /// `true` if the selection was replaced
    pub fn resnap(&mut self, vertices: &[GeoPoint]) -> bool {
        if self.points.is_empty() {
            return false;
        }

        let mut seen = FxHashSet::default();
        let next: Vec<GeoPoint> = self
            .points
            .iter()
            .filter_map(|p| nearest_vertex(p, vertices))
            .filter(|p| seen.insert(dedup_key(p)))
            .collect();

        let changed = next.len() != self.points.len()
            || next.iter().zip(&self.points).any(|(n, p)| {
                (n.lat - p.lat).abs() > CHANGE_EPSILON || (n.lng - p.lng).abs() > CHANGE_EPSILON
            });

        if changed {
            self.points = next;
        }
        changed
    }
}

/// Quantized string key used to collapse near-identical snapped points
fn dedup_key(point: &GeoPoint) -> String {
    format!("{:.9},{:.9}", point.lat, point.lng)
}

/// The vertex currently highlighted under the pointer, if any
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HoverPoint(Option<GeoPoint>);

impl HoverPoint {
    pub fn get(&self) -> Option<GeoPoint> {
        self.0
    }

    pub fn set(&mut self, point: Option<GeoPoint>) {
        self.0 = point;
    }

    /// Point the hover at the vertex nearest to `pointer`, or clear it when
    /// there are no vertices
    pub fn track(&mut self, pointer: &GeoPoint, vertices: &[GeoPoint]) {
        self.0 = nearest_vertex(pointer, vertices);
    }

    /// Re-resolve the hover against a regenerated vertex set
    ///
    /// An unresolvable hover (no vertices) keeps its previous value.
    pub fn resnap(&mut self, vertices: &[GeoPoint]) {
        if let Some(current) = self.0 {
            if let Some(snapped) = nearest_vertex(&current, vertices) {
                self.0 = Some(snapped);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice(step: f64, n: usize) -> Vec<GeoPoint> {
        let mut out = Vec::new();
        for i in 0..n {
            for j in 0..n {
                out.push(GeoPoint::new(i as f64 * step, j as f64 * step));
            }
        }
        out
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut sel = SelectionSet::new();
        let p = GeoPoint::new(-15.0, -62.0);
        assert!(sel.toggle(p));
        assert_eq!(sel.len(), 1);
        assert!(!sel.toggle(p));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_toggle_matches_within_epsilon() {
        let mut sel = SelectionSet::new();
        sel.toggle(GeoPoint::new(1.0, 2.0));
        sel.toggle(GeoPoint::new(3.0, 4.0));
        assert!(!sel.toggle(GeoPoint::new(1.0 + 1e-10, 2.0 - 1e-10)));
        assert_eq!(sel.points(), &[GeoPoint::new(3.0, 4.0)]);

        // Outside the epsilon is a distinct point
        assert!(sel.toggle(GeoPoint::new(3.0 + 1e-6, 4.0)));
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_resnap_unchanged_vertices_is_noop() {
        let vertices = lattice(0.1, 5);
        let mut sel = SelectionSet::new();
        sel.toggle(vertices[3]);
        sel.toggle(vertices[7]);
        let before = sel.clone();
        assert!(!sel.resnap(&vertices));
        assert_eq!(sel, before);
    }

    #[test]
    fn test_resnap_moves_onto_new_lattice() {
        let mut sel = SelectionSet::new();
        sel.toggle(GeoPoint::new(0.11, 0.19));
        let vertices = lattice(0.1, 5);
        assert!(sel.resnap(&vertices));
        assert_eq!(sel.len(), 1);
        let p = sel.points()[0];
        assert!((p.lat - 0.1).abs() < 1e-12);
        assert!((p.lng - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_resnap_deduplicates_collisions() {
        let mut sel = SelectionSet::new();
        sel.toggle(GeoPoint::new(0.01, 0.01));
        sel.toggle(GeoPoint::new(0.02, 0.03));
        sel.toggle(GeoPoint::new(0.9, 0.9));
        let coarse = lattice(1.0, 2);
        assert!(sel.resnap(&coarse));
        assert_eq!(
            sel.points(),
            &[GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)]
        );
    }

    #[test]
    fn test_resnap_never_grows() {
        let mut sel = SelectionSet::new();
        for i in 0..10 {
            sel.toggle(GeoPoint::new(f64::from(i) * 0.013, f64::from(i) * 0.007));
        }
        let before = sel.len();
        sel.resnap(&lattice(0.05, 4));
        assert!(sel.len() <= before);
    }

    #[test]
    fn test_resnap_against_empty_vertices_drops_members() {
        let mut sel = SelectionSet::new();
        sel.toggle(GeoPoint::new(0.5, 0.5));
        assert!(sel.resnap(&[]));
        assert!(sel.is_empty());
        // Nothing left to change
        assert!(!sel.resnap(&[]));
    }

    #[test]
    fn test_hover_track_and_resnap() {
        let vertices = lattice(0.1, 3);
        let mut hover = HoverPoint::default();
        hover.track(&GeoPoint::new(0.12, 0.08), &vertices);
        assert_eq!(hover.get(), Some(GeoPoint::new(0.1, 0.1)));

        // Empty vertex set keeps the previous hover
        hover.resnap(&[]);
        assert_eq!(hover.get(), Some(GeoPoint::new(0.1, 0.1)));

        hover.resnap(&lattice(1.0, 2));
        assert_eq!(hover.get(), Some(GeoPoint::new(0.0, 0.0)));

        // Tracking with no vertices clears it
        hover.track(&GeoPoint::new(0.0, 0.0), &[]);
        assert_eq!(hover.get(), None);
    }
}
