//! Route progress data model consumed from the routing collaborator.
//!
//! Snapshots arrive per alert-level change and are read-only here: this
//! crate never computes distances or maneuver geometry, it only phrases
//! and speaks what the routing engine reports.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Opaque identity of a route step. De-duplication compares ids, never text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(pub u64);

/// Maneuver kind for the subset of phrasing rules that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManeuverType {
    Depart,
    Turn,
    Merge,
    Continue,
    Arrive,
    Other,
}

/// Proximity-to-maneuver tier driving phrasing urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLevel {
    Depart,
    Low,
    Medium,
    High,
    Arrive,
}

/// One maneuver within a route leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStep {
    pub id: StepId,
    /// Human-readable maneuver instruction. None for the implicit
    /// "no further instruction" step (e.g. absent final step).
    pub instruction: Option<String>,
    pub road_name: Option<String>,
    pub road_code: Option<String>,
    /// Step length in route distance units.
    pub distance: f64,
    pub maneuver: ManeuverType,
}

impl RouteStep {
    pub fn new(id: u64, instruction: impl Into<String>) -> Self {
        Self {
            id: StepId(id),
            instruction: Some(instruction.into()),
            road_name: None,
            road_code: None,
            distance: 0.0,
            maneuver: ManeuverType::Other,
        }
    }

    pub fn with_road(mut self, name: Option<&str>, code: Option<&str>) -> Self {
        self.road_name = name.map(str::to_string);
        self.road_code = code.map(str::to_string);
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_maneuver(mut self, maneuver: ManeuverType) -> Self {
        self.maneuver = maneuver;
        self
    }
}

/// Snapshot of progress along the current leg, delivered per alert-level
/// change. Contract: `follow_on_step` present implies `upcoming_step`
/// present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteProgress {
    pub current_step: RouteStep,
    pub upcoming_step: Option<RouteStep>,
    pub follow_on_step: Option<RouteStep>,
    pub alert_level: AlertLevel,
}

impl RouteProgress {
    pub fn new(
        current_step: RouteStep,
        upcoming_step: Option<RouteStep>,
        follow_on_step: Option<RouteStep>,
        alert_level: AlertLevel,
    ) -> Self {
        let progress = Self {
            current_step,
            upcoming_step,
            follow_on_step,
            alert_level,
        };
        progress.check_contract();
        progress
    }

    /// Contract violations are programming errors on the routing side,
    /// not runtime failures here.
    fn check_contract(&self) {
        if self.follow_on_step.is_some() && self.upcoming_step.is_none() {
            debug_assert!(false, "follow-on step present without upcoming step");
            warn!("Route progress contract violated: follow-on step without upcoming step");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_builder_sets_fields() {
        let step = RouteStep::new(7, "Turn left onto High Street")
            .with_road(Some("High Street"), Some("B42"))
            .with_distance(450.0)
            .with_maneuver(ManeuverType::Turn);

        assert_eq!(step.id, StepId(7));
        assert_eq!(step.road_code.as_deref(), Some("B42"));
        assert_eq!(step.maneuver, ManeuverType::Turn);
    }
}
