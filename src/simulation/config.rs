//! Tunable parameters for the evacuation simulation

use super::types::{MAX_SPEED_SCALE, MIN_SPEED_SCALE};

/// How the collision pass finds neighbouring agents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborSearch {
    /// Check every other agent on the floor
    Scan,
    /// Bucket agents into a uniform grid and only check nearby cells
    Grid,
}

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Global speed multiplier applied to movement and the clock
    pub speed_scale: f32,
    /// Extra clearance kept around every hazard
    pub hazard_margin: f32,
    /// How far past the hazard boundary a waypoint is pushed, relative to its penetration
    pub hazard_push_multiplier: f32,
    /// Gap kept between agents on top of their radii
    pub collision_buffer: f32,
    /// Waypoints used to walk from a room to its door
    pub room_exit_steps: usize,
    /// Waypoints used to walk from the door (or start) to the exit
    pub corridor_steps: usize,
    /// Radius around the requested point that batch members are scattered in
    pub batch_spread: f32,
    /// Also push tentative moves out of hazards while walking
    pub avoid_hazards_while_moving: bool,
    pub neighbor_search: NeighborSearch,
    /// Side length of a spatial grid cell
    pub grid_cell_size: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            speed_scale: 1.0,
            hazard_margin: 30.0,
            hazard_push_multiplier: 1.5,
            collision_buffer: 2.0,
            room_exit_steps: 8,
            corridor_steps: 20,
            batch_spread: 25.0,
            avoid_hazards_while_moving: false,
            neighbor_search: NeighborSearch::Grid,
            grid_cell_size: 32.0,
        }
    }
}

impl SimConfig {
    pub fn is_valid_speed_scale(scale: f32) -> bool {
        scale.is_finite() && (MIN_SPEED_SCALE..=MAX_SPEED_SCALE).contains(&scale)
    }
}
