//! Standalone evacuation simulation module
//!
//! This module contains the per-tick evacuation engine: path planning,
//! hazard avoidance, motion integration, collision correction and group
//! completion tracking. It has no rendering or input dependencies.

mod agent;
mod agent_manager;
mod clock;
mod collision;
mod command;
mod config;
mod floor_plan;
mod geometry;
mod group;
mod hazard_field;
mod planner;
mod spatial_grid;
mod types;
mod world;

pub use agent::{Agent, AgentCategory, AgentUpdateResult};
pub use clock::{RunState, SimClock};
pub use collision::{contain, resolve, separate, Neighbor};
pub use command::{AgentEdit, Command};
pub use config::{NeighborSearch, SimConfig};
pub use floor_plan::{
    parse_floor_tag, Exit, FloorPlan, Hazard, HazardKind, Room, SafeZone,
};
pub use geometry::{nearest, Position, Rect};
pub use group::{summarize_groups, GroupCoordinator, GroupEvacuated, GroupSummary};
pub use hazard_field::HazardField;
pub use planner::{containing_room, nearest_exit, plan, PlannerSteps};
pub use spatial_grid::SpatialGrid;
pub use types::{
    AgentId, ExitId, GroupId, HazardId, RoomId, SafeZoneId, SimId, CLOCK_INCREMENT,
    MAX_SPEED_SCALE, MIN_SPEED_SCALE, PLACEMENT_INSET, TICK_DURATION, WALL_CLEARANCE,
};
pub use world::{AgentSnapshot, CategoryProgress, EvacuationProgress, SimWorld, TickReport};
