//! Agent state and per-tick motion integration
//!
//! An agent moves through `NoPath -> Advancing -> Evacuated`. Planning is
//! done by the world when `step` reports `NeedsPath`; the agent stays in
//! place for that tick.

use super::geometry::Position;
use super::types::{AgentId, GroupId};

/// Kind of person, which fixes base speed and body size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentCategory {
    Adult,
    Child,
    Elderly,
    MobilityImpaired,
}

impl AgentCategory {
    pub const ALL: [AgentCategory; 4] = [
        AgentCategory::Adult,
        AgentCategory::Child,
        AgentCategory::Elderly,
        AgentCategory::MobilityImpaired,
    ];

    /// Walking speed in plan units per second
    pub fn base_speed(&self) -> f32 {
        match self {
            AgentCategory::Adult => 90.0,
            AgentCategory::Child => 72.0,
            AgentCategory::Elderly => 48.0,
            AgentCategory::MobilityImpaired => 30.0,
        }
    }

    /// Collision radius in plan units
    pub fn radius(&self) -> f32 {
        match self {
            AgentCategory::Adult => 10.0,
            AgentCategory::Child => 8.0,
            AgentCategory::Elderly => 10.0,
            AgentCategory::MobilityImpaired => 12.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgentCategory::Adult => "adult",
            AgentCategory::Child => "child",
            AgentCategory::Elderly => "elderly",
            AgentCategory::MobilityImpaired => "mobility-impaired",
        }
    }
}

/// Outcome of integrating one agent for one tick
#[derive(Debug, Clone, PartialEq)]
pub enum AgentUpdateResult {
    /// Agent is already evacuated and must not be touched
    Frozen,
    /// Agent has no path yet and should be planned for
    NeedsPath,
    /// Agent walks to this tentative position
    Moved(Position),
    /// Agent reached an intermediate waypoint and snaps onto it
    ReachedWaypoint(Position),
    /// Agent reached its final waypoint
    Evacuated,
}

/// A person in the evacuation simulation
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub position: Position,
    /// Where the agent was placed; restored on reset
    pub spawn_position: Position,
    pub category: AgentCategory,
    /// Speed in plan units per second
    pub speed: f32,
    pub radius: f32,
    pub evacuated: bool,
    /// Elapsed simulation time at which the agent evacuated
    pub evacuated_at: Option<f32>,
    pub path: Vec<Position>,
    /// Index into `path` of the waypoint being walked to
    pub cursor: usize,
    pub floor: u32,
    pub group: Option<GroupId>,
}

impl Agent {
    pub fn new(
        id: AgentId,
        category: AgentCategory,
        position: Position,
        floor: u32,
        group: Option<GroupId>,
    ) -> Self {
        Self {
            id,
            position,
            spawn_position: position,
            category,
            speed: category.base_speed(),
            radius: category.radius(),
            evacuated: false,
            evacuated_at: None,
            path: Vec::new(),
            cursor: 0,
            floor,
            group,
        }
    }

    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// Distance covered in one tick at the given global speed scale
    pub fn step_distance(&self, speed_scale: f32, tick_duration: f32) -> f32 {
        self.speed * speed_scale * tick_duration
    }

    /// Advance along the current path by `step_distance`, without mutating
    /// the agent. The caller commits the result after collision correction.
    pub fn step(&self, step_distance: f32) -> AgentUpdateResult {
        if self.evacuated {
            return AgentUpdateResult::Frozen;
        }
        if self.path.is_empty() {
            return AgentUpdateResult::NeedsPath;
        }

        let target = match self.path.get(self.cursor) {
            Some(target) => *target,
            None => return AgentUpdateResult::Evacuated,
        };

        if self.position.distance(&target) < step_distance {
            if self.cursor + 1 >= self.path.len() {
                AgentUpdateResult::Evacuated
            } else {
                AgentUpdateResult::ReachedWaypoint(target)
            }
        } else {
            AgentUpdateResult::Moved(self.position.step_towards(&target, step_distance))
        }
    }

    /// Install a freshly planned path
    pub fn set_path(&mut self, path: Vec<Position>) {
        self.path = path;
        self.cursor = 0;
    }

    pub fn clear_path(&mut self) {
        self.path.clear();
        self.cursor = 0;
    }

    pub fn move_to(&mut self, position: Position) {
        self.position = position;
    }

    /// Commit a waypoint arrival; `position` is the corrected snap position
    pub fn advance_to(&mut self, position: Position) {
        self.position = position;
        self.cursor += 1;
    }

    /// Freeze the agent. Returns false if it was already evacuated.
    pub fn mark_evacuated(&mut self, time: f32) -> bool {
        if self.evacuated {
            return false;
        }
        self.evacuated = true;
        self.evacuated_at = Some(time);
        true
    }

    /// Return to the placement position with no path
    pub fn reset(&mut self) {
        self.position = self.spawn_position;
        self.evacuated = false;
        self.evacuated_at = None;
        self.clear_path();
    }

    /// Waypoint the agent is currently walking to
    pub fn current_waypoint(&self) -> Option<Position> {
        self.path.get(self.cursor).copied()
    }
}
