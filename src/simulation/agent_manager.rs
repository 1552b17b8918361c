//! Agent bookkeeping and the per-tick update pass
//!
//! Agents are updated one at a time in list order and their corrected
//! positions are committed immediately, so later agents in the pass collide
//! against positions already moved this tick.

use anyhow::{bail, Context, Result};
use log::debug;

use super::agent::{Agent, AgentUpdateResult};
use super::collision::{self, Neighbor};
use super::command::AgentEdit;
use super::config::{NeighborSearch, SimConfig};
use super::floor_plan::{FloorPlan, Room};
use super::geometry::Position;
use super::hazard_field::HazardField;
use super::planner::{self, PlannerSteps};
use super::spatial_grid::SpatialGrid;
use super::types::{AgentId, TICK_DURATION};

/// Neighbour lookup used during one pass
enum NeighborIndex {
    Scan { count: usize },
    Grid(SpatialGrid),
}

impl NeighborIndex {
    fn build(agents: &[Agent], floor: u32, config: &SimConfig) -> Self {
        match config.neighbor_search {
            NeighborSearch::Scan => NeighborIndex::Scan {
                count: agents.len(),
            },
            NeighborSearch::Grid => {
                let mut grid = SpatialGrid::new(config.grid_cell_size);
                for (index, agent) in agents.iter().enumerate() {
                    if is_active_on(agent, floor) {
                        grid.insert(index, &agent.position);
                    }
                }
                NeighborIndex::Grid(grid)
            }
        }
    }

    fn candidates(&self, position: &Position, range: f32) -> Vec<usize> {
        match self {
            NeighborIndex::Scan { count } => (0..*count).collect(),
            NeighborIndex::Grid(grid) => grid.query(position, range),
        }
    }

    fn relocate(&mut self, index: usize, from: &Position, to: &Position) {
        if let NeighborIndex::Grid(grid) = self {
            grid.relocate(index, from, to);
        }
    }

    fn remove(&mut self, index: usize, position: &Position) {
        if let NeighborIndex::Grid(grid) = self {
            grid.remove(index, position);
        }
    }
}

fn is_active_on(agent: &Agent, floor: u32) -> bool {
    !agent.evacuated && agent.floor == floor
}

/// Collision outcome for one tentative move
struct Correction {
    /// Final position after separation and containment
    position: Position,
    /// Another agent pushed the move off course
    crowded: bool,
}

/// Run the collision resolver for agent `index` against everyone else
fn correct_move(
    index: usize,
    tentative: Position,
    agents: &[Agent],
    neighbor_index: &NeighborIndex,
    rooms: &[&Room],
    config: &SimConfig,
    max_radius: f32,
) -> Correction {
    let agent = &agents[index];
    let reach = agent.radius + max_radius + config.collision_buffer;

    let neighbors = neighbor_index
        .candidates(&tentative, reach * 2.0)
        .into_iter()
        .filter(|&j| j != index)
        .map(|j| &agents[j])
        .filter(|other| is_active_on(other, agent.floor))
        .map(|other| Neighbor {
            id: other.id,
            position: other.position,
            radius: other.radius,
        });

    let separated = collision::separate(
        agent.id,
        tentative,
        agent.radius,
        neighbors,
        config.collision_buffer,
    );

    Correction {
        position: collision::contain(agent.position, separated, rooms),
        crowded: separated != tentative,
    }
}

/// Update every non-evacuated agent on `floor` for one tick
///
/// Returns the agents that evacuated during this pass, in update order.
pub fn update_agents(
    agents: &mut [Agent],
    plan: &FloorPlan,
    config: &SimConfig,
    floor: u32,
    time: f32,
) -> Vec<AgentId> {
    let rooms = plan.rooms_on_floor(floor);
    let field = HazardField::from_config(plan.hazards_on_floor(floor), config);
    let steps = PlannerSteps::from_config(config);
    let mut neighbor_index = NeighborIndex::build(agents, floor, config);
    let max_radius = agents
        .iter()
        .filter(|a| is_active_on(a, floor))
        .map(|a| a.radius)
        .fold(0.0, f32::max);

    let mut evacuated = Vec::new();

    for index in 0..agents.len() {
        if !is_active_on(&agents[index], floor) {
            continue;
        }

        let step_distance = agents[index].step_distance(config.speed_scale, TICK_DURATION);

        let (tentative, reached_waypoint) = match agents[index].step(step_distance) {
            AgentUpdateResult::Frozen => continue,
            AgentUpdateResult::NeedsPath => {
                let path = planner::plan(&agents[index], &plan.exits, &rooms, &field, steps);
                agents[index].set_path(path);
                continue;
            }
            AgentUpdateResult::Evacuated => {
                let agent = &mut agents[index];
                if agent.mark_evacuated(time) {
                    neighbor_index.remove(index, &agent.position);
                    evacuated.push(agent.id);
                }
                continue;
            }
            AgentUpdateResult::Moved(tentative) => {
                if config.avoid_hazards_while_moving {
                    (field.repel(tentative), false)
                } else {
                    (tentative, false)
                }
            }
            AgentUpdateResult::ReachedWaypoint(target) => (target, true),
        };

        let correction = correct_move(
            index,
            tentative,
            agents,
            &neighbor_index,
            &rooms,
            config,
            max_radius,
        );
        let corrected = correction.position;

        let agent = &mut agents[index];
        let previous = agent.position;
        // An agent held back by other agents within contact distance of its
        // waypoint has arrived, otherwise agents converging on a shared door
        // or exit hold each other off it. Walls never count.
        let arrival_tolerance = agent.radius + max_radius + config.collision_buffer;
        let crowded_arrival = !reached_waypoint
            && correction.crowded
            && agent
                .current_waypoint()
                .map_or(false, |w| corrected.distance(&w) <= arrival_tolerance);
        if crowded_arrival {
            debug!(
                "Agent {:?} reached waypoint {} through a crowd",
                agent.id.0, agent.cursor
            );
        }
        if reached_waypoint || crowded_arrival {
            agent.advance_to(corrected);
        } else {
            agent.move_to(corrected);
        }
        neighbor_index.relocate(index, &previous, &corrected);
    }

    evacuated
}

/// Remove an agent from the list, returning it
pub fn remove_agent(agents: &mut Vec<Agent>, agent_id: AgentId) -> Option<Agent> {
    let index = agents.iter().position(|a| a.id == agent_id)?;
    Some(agents.remove(index))
}

/// Apply an edit to an agent; the agent will replan on its next tick
pub fn edit_agent(agents: &mut [Agent], agent_id: AgentId, edit: &AgentEdit) -> Result<()> {
    if let Some(speed) = edit.speed {
        if !(speed.is_finite() && speed > 0.0) {
            bail!("Agent speed must be positive, got {}", speed);
        }
    }
    if let Some(radius) = edit.radius {
        if !(radius.is_finite() && radius > 0.0) {
            bail!("Agent radius must be positive, got {}", radius);
        }
    }
    if let Some(position) = edit.position {
        if !(position.x.is_finite() && position.y.is_finite()) {
            bail!("Agent position must be finite");
        }
    }

    let agent = agents
        .iter_mut()
        .find(|a| a.id == agent_id)
        .context("Agent not found")?;

    if let Some(category) = edit.category {
        agent.category = category;
        agent.speed = category.base_speed();
        agent.radius = category.radius();
    }
    if let Some(speed) = edit.speed {
        agent.speed = speed;
    }
    if let Some(radius) = edit.radius {
        agent.radius = radius;
    }
    if let Some(position) = edit.position {
        agent.position = position;
        agent.spawn_position = position;
    }
    agent.clear_path();

    Ok(())
}

/// Put every agent back where it was placed, unevacuated and pathless
pub fn reset_agents(agents: &mut [Agent]) {
    for agent in agents {
        agent.reset();
    }
}
