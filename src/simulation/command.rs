//! Commands issued by the placement/configuration layer
//!
//! `SimWorld::apply` is the single entry point the outside world uses to
//! mutate a simulation between ticks.

use super::agent::AgentCategory;
use super::floor_plan::HazardKind;
use super::geometry::Position;
use super::types::{AgentId, GroupId, HazardId};

/// Changes to an existing agent. Unset fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct AgentEdit {
    /// Switching category also resets speed and radius to its defaults
    pub category: Option<AgentCategory>,
    pub speed: Option<f32>,
    pub radius: Option<f32>,
    pub position: Option<Position>,
}

#[derive(Debug, Clone)]
pub enum Command {
    /// Place `count` agents around `position` on the active floor
    PlaceAgents {
        category: AgentCategory,
        position: Position,
        count: usize,
        group: Option<GroupId>,
    },
    /// Place `count` agents at random spots inside rooms of the active floor
    PlaceAgentsInRooms {
        category: AgentCategory,
        count: usize,
    },
    EditAgent(AgentId, AgentEdit),
    RemoveAgent(AgentId),
    /// Place a hazard on the active floor
    PlaceHazard {
        kind: HazardKind,
        position: Position,
    },
    RemoveHazard(HazardId),
    Start,
    Pause,
    Reset,
    Restart,
    SetSpeedScale(f32),
    SwitchFloor(u32),
}
