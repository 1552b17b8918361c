//! Hazard repulsion applied to candidate points
//!
//! Each hazard pushes a point straight away from its centre when the point is
//! within `radius + margin`. Hazards are applied one after another in
//! placement order, so overlapping zones are not normalised against each
//! other.

use super::config::SimConfig;
use super::floor_plan::Hazard;
use super::geometry::Position;

/// Push direction used when a point sits exactly on a hazard centre
const FALLBACK_DIRECTION: (f32, f32) = (0.0, -1.0);

/// The hazards of one floor together with the avoidance parameters
#[derive(Debug, Clone)]
pub struct HazardField<'a> {
    hazards: Vec<&'a Hazard>,
    margin: f32,
    multiplier: f32,
}

impl<'a> HazardField<'a> {
    pub fn new(hazards: Vec<&'a Hazard>, margin: f32, multiplier: f32) -> Self {
        Self {
            hazards,
            margin,
            multiplier,
        }
    }

    pub fn from_config(hazards: Vec<&'a Hazard>, config: &SimConfig) -> Self {
        Self::new(hazards, config.hazard_margin, config.hazard_push_multiplier)
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    /// Move `point` out of every hazard it falls inside
    pub fn repel(&self, point: Position) -> Position {
        self.hazards.iter().fold(point, |point, hazard| {
            if hazard.radius <= 0.0 {
                return point;
            }
            let reach = hazard.radius + self.margin;
            let distance = point.distance(&hazard.center);
            if distance >= reach {
                return point;
            }
            let (dx, dy) = point
                .direction_from(&hazard.center)
                .unwrap_or(FALLBACK_DIRECTION);
            let push = (reach - distance) * self.multiplier;
            point.offset(dx * push, dy * push)
        })
    }

    /// Smallest distance from `point` to the avoidance boundary of any
    /// hazard. Negative when the point is inside one.
    pub fn clearance(&self, point: &Position) -> Option<f32> {
        self.hazards
            .iter()
            .filter(|h| h.radius > 0.0)
            .map(|h| point.distance(&h.center) - (h.radius + self.margin))
            .reduce(f32::min)
    }
}
