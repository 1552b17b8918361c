//! Collision correction for tentative agent moves
//!
//! Two passes run on every tentative position: separation from other agents,
//! then containment against rooms the agent is not standing in. Neither pass
//! can fail. Neighbours are resolved one at a time in agent order, so dense
//! crowds can keep a little residual overlap.

use super::floor_plan::Room;
use super::geometry::Position;
use super::types::{AgentId, WALL_CLEARANCE};

/// Upper bound on successive wall clamps for one position
const MAX_CONTAINMENT_PASSES: usize = 4;

/// Another agent as seen by the collision pass
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub id: AgentId,
    pub position: Position,
    pub radius: f32,
}

/// Push `tentative` away from every overlapping neighbour until the pair is
/// exactly `radius + neighbor.radius + buffer` apart
pub fn separate<I>(
    id: AgentId,
    tentative: Position,
    radius: f32,
    neighbors: I,
    buffer: f32,
) -> Position
where
    I: IntoIterator<Item = Neighbor>,
{
    neighbors
        .into_iter()
        .filter(|n| n.id != id)
        .fold(tentative, |position, neighbor| {
            let min_distance = radius + neighbor.radius + buffer;
            if position.distance(&neighbor.position) >= min_distance {
                return position;
            }
            // Coincident agents split along x by id so they never chase each other
            let fallback = if id < neighbor.id { (-1.0, 0.0) } else { (1.0, 0.0) };
            let (dx, dy) = position
                .direction_from(&neighbor.position)
                .unwrap_or(fallback);
            neighbor.position.offset(dx * min_distance, dy * min_distance)
        })
}

/// Keep `tentative` out of every room that does not contain `current`.
/// Rooms containing `current` are the agent's home and never constrain it.
pub fn contain(current: Position, tentative: Position, rooms: &[&Room]) -> Position {
    let foreign_room_at = |point: &Position| {
        rooms
            .iter()
            .find(|room| room.rect.contains(point) && !room.rect.contains(&current))
    };

    let mut corrected = tentative;
    for _ in 0..MAX_CONTAINMENT_PASSES {
        match foreign_room_at(&corrected) {
            Some(room) => corrected = room.rect.push_outside(corrected, WALL_CLEARANCE),
            None => return corrected,
        }
    }

    // Wedged between rooms; staying put is always valid
    if foreign_room_at(&corrected).is_some() {
        current
    } else {
        corrected
    }
}

/// Full correction: agent separation followed by wall containment
pub fn resolve<I>(
    id: AgentId,
    current: Position,
    tentative: Position,
    radius: f32,
    neighbors: I,
    rooms: &[&Room],
    buffer: f32,
) -> Position
where
    I: IntoIterator<Item = Neighbor>,
{
    let separated = separate(id, tentative, radius, neighbors, buffer);
    contain(current, separated, rooms)
}
