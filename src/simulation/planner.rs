//! Waypoint planning from an agent to the nearest exit
//!
//! Paths are straight-line interpolations, first out of the agent's room
//! through its door point and then towards the exit, with each waypoint
//! pushed out of nearby hazards. A path is planned once; hazards placed
//! afterwards do not trigger replanning.

use log::debug;

use super::agent::Agent;
use super::config::SimConfig;
use super::floor_plan::{Exit, Room};
use super::geometry::{nearest, Position};
use super::hazard_field::HazardField;

/// Step counts for the two legs of a path
#[derive(Debug, Clone, Copy)]
pub struct PlannerSteps {
    pub room_exit: usize,
    pub corridor: usize,
}

impl PlannerSteps {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            room_exit: config.room_exit_steps.max(1),
            corridor: config.corridor_steps.max(1),
        }
    }
}

impl Default for PlannerSteps {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

/// The exit closest to `position`
pub fn nearest_exit<'a>(position: &Position, exits: &'a [Exit]) -> Option<&'a Exit> {
    nearest(position, exits, |exit| exit.anchor())
}

/// The room containing `position`, first match wins
pub fn containing_room<'a>(position: &Position, rooms: &[&'a Room]) -> Option<&'a Room> {
    rooms.iter().copied().find(|room| room.rect.contains(position))
}

/// Append `steps` points interpolated from `from` (exclusive) to `to`
/// (inclusive), each run through the hazard field
fn interpolate_into(
    path: &mut Vec<Position>,
    from: Position,
    to: Position,
    steps: usize,
    field: &HazardField,
) {
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        path.push(field.repel(from.lerp(&to, t)));
    }
}

/// Plan a waypoint sequence for `agent`. Returns an empty path when there
/// are no exits to go to.
pub fn plan(
    agent: &Agent,
    exits: &[Exit],
    rooms: &[&Room],
    field: &HazardField,
    steps: PlannerSteps,
) -> Vec<Position> {
    let exit = match nearest_exit(&agent.position, exits) {
        Some(exit) => exit,
        None => {
            debug!("No exits available for agent {:?}", agent.id.0);
            return Vec::new();
        }
    };
    let target = exit.anchor();

    let mut path = Vec::with_capacity(steps.room_exit + steps.corridor);

    let corridor_start = match containing_room(&agent.position, rooms) {
        Some(room) => {
            let door = room.door_point();
            interpolate_into(&mut path, agent.position, door, steps.room_exit, field);
            door
        }
        None => agent.position,
    };

    interpolate_into(&mut path, corridor_start, target, steps.corridor, field);

    debug!(
        "Planned {} waypoints for agent {:?} towards exit {:?}",
        path.len(),
        agent.id.0,
        exit.id.0
    );

    path
}
