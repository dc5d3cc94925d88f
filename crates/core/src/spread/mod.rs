//! Fire-spread projection
//!
//! Turns ignition points (or a detected perimeter) into short directional
//! spread vectors, each paired with a suppression action plan. The jitter is
//! random noise standing in for fire physics; nothing here models combustion.
//!
//! # Modes
//! - **Ignition points**: bearing follows the wind with ±25° jitter, length is
//!   `80 m + 2 × wind speed`, projected with [`crate::geodesy::project`].
//! - **Perimeter**: about 25 boundary samples pushed outward from the
//!   centroid by 0.007–0.011 degrees (a degree-space offset, not meters).

pub mod perimeter;
pub mod simulator;

pub use perimeter::{PerimeterSample, Radar};
pub use simulator::{FireSpreadSimulator, PendingRun, SimulatorState, SpreadConfig, SpreadInput};

use crate::core_types::GeoPoint;
use serde::{Deserialize, Serialize};

/// Projected spread from an ignition or perimeter point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireVector {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

/// Suppression plan placed at the head of a fire vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub at: GeoPoint,
    pub summary: String,
}

/// Output of one simulation run, as persisted by the store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationState {
    pub fire_vectors: Vec<FireVector>,
    pub action_plans: Vec<ActionPlan>,
}

impl SimulationState {
    /// Pair every vector with its action plan
    pub fn from_vectors(fire_vectors: Vec<FireVector>) -> Self {
        let action_plans = action_plans(&fire_vectors);
        Self {
            fire_vectors,
            action_plans,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fire_vectors.is_empty() && self.action_plans.is_empty()
    }
}

/// One plan per vector, numbered from 1, placed at the vector's end point
pub fn action_plans(vectors: &[FireVector]) -> Vec<ActionPlan> {
    vectors
        .iter()
        .enumerate()
        .map(|(i, v)| ActionPlan {
            at: v.end,
            summary: format!(
                "Plan {}: Establish 30m firewall ahead of projected spread; stage crew downwind.",
                i + 1
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_plans_follow_vectors() {
        let vectors = vec![
            FireVector {
                start: GeoPoint::new(0.0, 0.0),
                end: GeoPoint::new(0.001, 0.0),
            },
            FireVector {
                start: GeoPoint::new(1.0, 1.0),
                end: GeoPoint::new(1.0, 1.002),
            },
        ];
        let state = SimulationState::from_vectors(vectors);
        assert_eq!(state.action_plans.len(), 2);
        assert_eq!(state.action_plans[1].at, GeoPoint::new(1.0, 1.002));
        assert_eq!(
            state.action_plans[0].summary,
            "Plan 1: Establish 30m firewall ahead of projected spread; stage crew downwind."
        );
        assert!(state.action_plans[1].summary.starts_with("Plan 2: "));
    }

    #[test]
    fn test_empty_state() {
        let state = SimulationState::from_vectors(Vec::new());
        assert!(state.is_empty());
        assert_eq!(state, SimulationState::default());
    }

    #[test]
    fn test_state_json_shape() {
        let state = SimulationState::from_vectors(vec![FireVector {
            start: GeoPoint::new(1.0, 2.0),
            end: GeoPoint::new(3.0, 4.0),
        }]);
        let json = serde_json::to_value(&state.fire_vectors).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"start": {"lat": 1.0, "lng": 2.0}, "end": {"lat": 3.0, "lng": 4.0}}])
        );
    }
}
